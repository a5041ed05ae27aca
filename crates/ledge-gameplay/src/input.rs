//! Input handling for the character controller.
//!
//! This module provides the input-source contract the controller reads each
//! tick, logical action bindings, runtime control settings, and a keyboard
//! state tracker that implements the contract.

use std::collections::HashMap;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    /// A key
    A,
    /// C key
    C,
    /// D key
    D,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// W key
    W,
    /// X key
    X,
    /// Space bar
    Space,
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Left Shift
    LShift,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Error returned when a key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for KeyCode {
    type Err = UnknownKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let key = match name.to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "c" => Self::C,
            "d" => Self::D,
            "r" => Self::R,
            "s" => Self::S,
            "t" => Self::T,
            "w" => Self::W,
            "x" => Self::X,
            "space" => Self::Space,
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "shift" | "lshift" => Self::LShift,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => return Err(UnknownKey(name.to_string())),
        };
        Ok(key)
    }
}

/// State of a button (pressed, just pressed, released).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the button is currently held down
    pub pressed: bool,
    /// Whether the button was just pressed this tick
    pub just_pressed: bool,
    /// Whether the button was just released this tick
    pub just_released: bool,
}

impl ButtonState {
    /// Update the button state based on whether it's currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.just_released = !is_pressed && self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the tick-specific state (just_pressed, just_released).
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Raw keyboard contract consumed by the controller.
pub trait InputSource {
    /// Checks if a key is held.
    fn is_down(&self, key: KeyCode) -> bool;

    /// Checks if a key went down this tick (edge, not hold).
    fn is_pressed(&self, key: KeyCode) -> bool;

    /// Mutable list of currently held keys, shared with the input layer.
    fn down_keys_mut(&mut self) -> &mut Vec<KeyCode>;
}

/// Logical actions the controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move left
    MoveLeft,
    /// Move right
    MoveRight,
    /// Aim up (dash direction, optional jump)
    MoveUp,
    /// Aim down (dash direction)
    MoveDown,
    /// Jump and grapple
    Jump,
    /// Dash attack
    Dash,
    /// Toggle whether up keys also jump
    ToggleUpToJump,
    /// Debug restart key; scrubbed from the held-key list each tick
    Restart,
}

/// Physical keys bound to each action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Keys for [`Action::MoveLeft`]
    pub left: Vec<KeyCode>,
    /// Keys for [`Action::MoveRight`]
    pub right: Vec<KeyCode>,
    /// Keys for [`Action::MoveUp`]
    pub up: Vec<KeyCode>,
    /// Keys for [`Action::MoveDown`]
    pub down: Vec<KeyCode>,
    /// Keys for [`Action::Jump`]
    pub jump: Vec<KeyCode>,
    /// Keys for [`Action::Dash`]
    pub dash: Vec<KeyCode>,
    /// Keys for [`Action::ToggleUpToJump`]
    pub toggle_up_to_jump: Vec<KeyCode>,
    /// Keys for [`Action::Restart`]
    pub restart: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec![KeyCode::A, KeyCode::Left],
            right: vec![KeyCode::D, KeyCode::Right],
            up: vec![KeyCode::W, KeyCode::Up],
            down: vec![KeyCode::S, KeyCode::Down],
            jump: vec![KeyCode::Space, KeyCode::C],
            dash: vec![KeyCode::LShift, KeyCode::X, KeyCode::Enter],
            toggle_up_to_jump: vec![KeyCode::T],
            restart: vec![KeyCode::R],
        }
    }
}

impl KeyBindings {
    /// Keys bound to an action.
    #[must_use]
    pub fn keys(&self, action: Action) -> &[KeyCode] {
        match action {
            Action::MoveLeft => &self.left,
            Action::MoveRight => &self.right,
            Action::MoveUp => &self.up,
            Action::MoveDown => &self.down,
            Action::Jump => &self.jump,
            Action::Dash => &self.dash,
            Action::ToggleUpToJump => &self.toggle_up_to_jump,
            Action::Restart => &self.restart,
        }
    }

    /// Rebind an action to a new key list.
    pub fn rebind(&mut self, action: Action, keys: Vec<KeyCode>) {
        let slot = match action {
            Action::MoveLeft => &mut self.left,
            Action::MoveRight => &mut self.right,
            Action::MoveUp => &mut self.up,
            Action::MoveDown => &mut self.down,
            Action::Jump => &mut self.jump,
            Action::Dash => &mut self.dash,
            Action::ToggleUpToJump => &mut self.toggle_up_to_jump,
            Action::Restart => &mut self.restart,
        };
        *slot = keys;
    }
}

/// Runtime control settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Up keys also trigger jump
    pub up_to_jump: bool,
}

impl ControlSettings {
    /// Flips `up_to_jump` and returns the new value.
    pub fn toggle_up_to_jump(&mut self) -> bool {
        self.up_to_jump = !self.up_to_jump;
        self.up_to_jump
    }
}

/// Bindings plus settings: resolves logical actions against an input source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Key bindings
    pub bindings: KeyBindings,
    /// Runtime settings
    pub settings: ControlSettings,
}

impl Controls {
    /// Creates controls from bindings and settings.
    #[must_use]
    pub fn new(bindings: KeyBindings, settings: ControlSettings) -> Self {
        Self { bindings, settings }
    }

    fn any_key<F: Fn(KeyCode) -> bool>(&self, action: Action, test: F) -> bool {
        let bound = self.bindings.keys(action).iter().any(|&key| test(key));
        if bound {
            return true;
        }
        action == Action::Jump
            && self.settings.up_to_jump
            && self.bindings.keys(Action::MoveUp).iter().any(|&key| test(key))
    }

    /// Check if an action is held.
    pub fn is_held<I: InputSource + ?Sized>(&self, input: &I, action: Action) -> bool {
        self.any_key(action, |key| input.is_down(key))
    }

    /// Check if an action was pressed this tick.
    pub fn was_pressed<I: InputSource + ?Sized>(&self, input: &I, action: Action) -> bool {
        self.any_key(action, |key| input.is_pressed(key))
    }

    /// Held direction: x is right minus left, y is down minus up.
    ///
    /// Opposite keys cancel to zero.
    pub fn direction<I: InputSource + ?Sized>(&self, input: &I) -> IVec2 {
        let mut direction = IVec2::ZERO;
        if self.is_held(input, Action::MoveUp) {
            direction.y -= 1;
        }
        if self.is_held(input, Action::MoveDown) {
            direction.y += 1;
        }
        if self.is_held(input, Action::MoveRight) {
            direction.x += 1;
        }
        if self.is_held(input, Action::MoveLeft) {
            direction.x -= 1;
        }
        direction
    }

    /// Applies the toggle action if it was pressed this tick.
    pub fn handle_toggle<I: InputSource + ?Sized>(&mut self, input: &I) {
        if self.was_pressed(input, Action::ToggleUpToJump) {
            let enabled = self.settings.toggle_up_to_jump();
            info!(enabled, "up-to-jump toggled");
        }
    }

    /// Removes every restart-bound key from the source's held list.
    pub fn scrub_debug_keys<I: InputSource + ?Sized>(&self, input: &mut I) {
        let restart = self.bindings.keys(Action::Restart);
        input.down_keys_mut().retain(|key| !restart.contains(key));
    }
}

/// Keyboard tracker implementing [`InputSource`].
///
/// The held list only gains a key on its press edge, so a key removed from
/// it stays "up" until it is released and pressed again.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    /// Edge tracking per key
    key_states: HashMap<KeyCode, ButtonState>,
    /// Held keys in press order
    down: Vec<KeyCode>,
}

impl KeyboardState {
    /// Create an empty keyboard state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a key state.
    pub fn update_key(&mut self, key: KeyCode, is_pressed: bool) {
        let state = self.key_states.entry(key).or_default();
        state.update(is_pressed);
        if state.just_pressed && !self.down.contains(&key) {
            self.down.push(key);
        }
        if state.just_released {
            self.down.retain(|&held| held != key);
        }
    }

    /// Press a key.
    pub fn press(&mut self, key: KeyCode) {
        self.update_key(key, true);
    }

    /// Release a key.
    pub fn release(&mut self, key: KeyCode) {
        self.update_key(key, false);
    }

    /// Holds exactly `held`, releasing every other tracked key.
    pub fn apply_held(&mut self, held: &[KeyCode]) {
        let tracked: Vec<KeyCode> = self.key_states.keys().copied().collect();
        for key in tracked {
            if !held.contains(&key) {
                self.update_key(key, false);
            }
        }
        for &key in held {
            self.update_key(key, true);
        }
    }

    /// Clear tick-specific state. Call after each simulation tick.
    pub fn end_tick(&mut self) {
        for state in self.key_states.values_mut() {
            state.clear_frame();
        }
    }
}

impl InputSource for KeyboardState {
    fn is_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }

    fn is_pressed(&self, key: KeyCode) -> bool {
        self.key_states
            .get(&key)
            .is_some_and(|state| state.just_pressed)
    }

    fn down_keys_mut(&mut self) -> &mut Vec<KeyCode> {
        &mut self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_state() {
        let mut state = ButtonState::default();

        state.update(true);
        assert!(state.pressed);
        assert!(state.just_pressed);

        state.clear_frame();
        state.update(true);
        assert!(state.pressed);
        assert!(!state.just_pressed);

        state.clear_frame();
        state.update(false);
        assert!(!state.pressed);
        assert!(state.just_released);
    }

    #[test]
    fn test_keyboard_edges() {
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::Space);
        assert!(keyboard.is_down(KeyCode::Space));
        assert!(keyboard.is_pressed(KeyCode::Space));

        keyboard.end_tick();
        keyboard.press(KeyCode::Space);
        assert!(keyboard.is_down(KeyCode::Space));
        assert!(!keyboard.is_pressed(KeyCode::Space));

        keyboard.end_tick();
        keyboard.release(KeyCode::Space);
        assert!(!keyboard.is_down(KeyCode::Space));
        assert!(!keyboard.is_pressed(KeyCode::Space));
    }

    #[test]
    fn test_scrubbed_key_stays_up_until_repressed() {
        let controls = Controls::default();
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::R);
        keyboard.press(KeyCode::D);

        controls.scrub_debug_keys(&mut keyboard);
        assert!(!keyboard.is_down(KeyCode::R));
        assert!(keyboard.is_down(KeyCode::D));

        keyboard.end_tick();
        keyboard.apply_held(&[KeyCode::R, KeyCode::D]);
        assert!(!keyboard.is_down(KeyCode::R));

        keyboard.end_tick();
        keyboard.apply_held(&[KeyCode::D]);
        keyboard.end_tick();
        keyboard.apply_held(&[KeyCode::R, KeyCode::D]);
        assert!(keyboard.is_down(KeyCode::R));
    }

    #[test]
    fn test_direction_cancels_opposites() {
        let controls = Controls::default();
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::A);
        keyboard.press(KeyCode::Right);
        keyboard.press(KeyCode::W);

        assert_eq!(controls.direction(&keyboard), IVec2::new(0, -1));
    }

    #[test]
    fn test_up_to_jump_toggle() {
        let mut controls = Controls::default();
        let mut keyboard = KeyboardState::new();
        keyboard.press(KeyCode::W);
        assert!(!controls.is_held(&keyboard, Action::Jump));

        keyboard.press(KeyCode::T);
        controls.handle_toggle(&keyboard);
        assert!(controls.settings.up_to_jump);
        assert!(controls.is_held(&keyboard, Action::Jump));
        assert!(controls.was_pressed(&keyboard, Action::Jump));

        let mut settings = controls.settings;
        assert!(!settings.toggle_up_to_jump());
    }

    #[test]
    fn test_rebind() {
        let mut bindings = KeyBindings::default();
        bindings.rebind(Action::Jump, vec![KeyCode::W]);
        assert_eq!(bindings.keys(Action::Jump), &[KeyCode::W]);
    }

    #[test]
    fn test_key_names() {
        assert_eq!("Space".parse::<KeyCode>(), Ok(KeyCode::Space));
        assert_eq!("shift".parse::<KeyCode>(), Ok(KeyCode::LShift));
        assert!("f13".parse::<KeyCode>().is_err());
    }
}
