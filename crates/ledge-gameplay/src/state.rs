//! Locomotion state machine.
//!
//! States are a tagged union: each variant owns only its transient data, and
//! every transition builds a fresh value, so entry always resets that data.
//! Requests go through a small policy table with special cases against
//! animation flicker; `hard_set` bypasses it for a state's own exits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::{clip_for, AnimationClip, AnimationCursor};
use crate::dash::DashAttack;
use crate::tuning::{JumpToFallExit, MovementTuning};

/// Discriminant of a [`LocomotionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocomotionKind {
    /// Standing still on the ground
    Idle,
    /// Moving on the ground
    Running,
    /// Rising through the air
    Jump,
    /// Between rising and falling
    JumpToFall,
    /// Falling through the air
    Fall,
    /// Sliding down a wall
    WallSlide,
    /// Dash attack in progress
    DashAttack,
}

impl fmt::Display for LocomotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Jump => "jump",
            Self::JumpToFall => "jump_to_fall",
            Self::Fall => "fall",
            Self::WallSlide => "wall_slide",
            Self::DashAttack => "dash_attack",
        };
        f.write_str(name)
    }
}

/// Current locomotion state with its per-state data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocomotionState {
    /// Standing still on the ground
    Idle,
    /// Moving on the ground
    Running,
    /// Rising through the air
    Jump,
    /// Between rising and falling
    JumpToFall,
    /// Falling through the air
    Fall,
    /// Sliding down a wall
    WallSlide,
    /// Dash attack in progress
    DashAttack(DashAttack),
}

impl LocomotionState {
    /// Freshly entered state of the given kind.
    #[must_use]
    pub fn fresh(kind: LocomotionKind) -> Self {
        match kind {
            LocomotionKind::Idle => Self::Idle,
            LocomotionKind::Running => Self::Running,
            LocomotionKind::Jump => Self::Jump,
            LocomotionKind::JumpToFall => Self::JumpToFall,
            LocomotionKind::Fall => Self::Fall,
            LocomotionKind::WallSlide => Self::WallSlide,
            LocomotionKind::DashAttack => Self::DashAttack(DashAttack::new()),
        }
    }

    /// Discriminant.
    #[must_use]
    pub fn kind(&self) -> LocomotionKind {
        match self {
            Self::Idle => LocomotionKind::Idle,
            Self::Running => LocomotionKind::Running,
            Self::Jump => LocomotionKind::Jump,
            Self::JumpToFall => LocomotionKind::JumpToFall,
            Self::Fall => LocomotionKind::Fall,
            Self::WallSlide => LocomotionKind::WallSlide,
            Self::DashAttack(_) => LocomotionKind::DashAttack,
        }
    }

    /// Whether wall contact may turn into a wall slide.
    #[must_use]
    pub fn can_wall_slide(&self) -> bool {
        !matches!(self, Self::DashAttack(_))
    }

    /// Whether a buffered dash may start. A dash still capturing its
    /// direction cannot be chained into.
    #[must_use]
    pub fn allows_dash_entry(&self) -> bool {
        match self {
            Self::DashAttack(dash) => dash.committed,
            _ => true,
        }
    }

    /// Dash data, if dashing.
    #[must_use]
    pub fn dash(&self) -> Option<&DashAttack> {
        match self {
            Self::DashAttack(dash) => Some(dash),
            _ => None,
        }
    }

    /// Mutable dash data, if dashing.
    pub fn dash_mut(&mut self) -> Option<&mut DashAttack> {
        match self {
            Self::DashAttack(dash) => Some(dash),
            _ => None,
        }
    }
}

/// A state change that took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Kind left
    pub from: LocomotionKind,
    /// Kind entered
    pub to: LocomotionKind,
}

/// Facts the per-state hooks read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookContext {
    /// Standing on ground this tick
    pub on_ground: bool,
    /// Vertical velocity is non-negative
    pub falling: bool,
}

/// Owns the current state, the previous kind and the animation cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachine {
    current: LocomotionState,
    previous: LocomotionKind,
    cursor: AnimationCursor,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(LocomotionKind::Idle)
    }
}

impl StateMachine {
    /// Starts in a fresh state of `kind`.
    #[must_use]
    pub fn new(kind: LocomotionKind) -> Self {
        Self {
            current: LocomotionState::fresh(kind),
            previous: kind,
            cursor: AnimationCursor::start(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> &LocomotionState {
        &self.current
    }

    /// Mutable current state.
    pub fn current_mut(&mut self) -> &mut LocomotionState {
        &mut self.current
    }

    /// Current kind.
    #[must_use]
    pub fn kind(&self) -> LocomotionKind {
        self.current.kind()
    }

    /// Kind at the end of the previous tick.
    #[must_use]
    pub fn previous(&self) -> LocomotionKind {
        self.previous
    }

    /// Clip for the current state.
    #[must_use]
    pub fn clip(&self) -> AnimationClip {
        clip_for(self.kind())
    }

    /// Animation cursor, reset on every entry.
    #[must_use]
    pub fn cursor(&self) -> AnimationCursor {
        self.cursor
    }

    fn enter(&mut self, kind: LocomotionKind) -> Transition {
        let from = self.kind();
        self.current = LocomotionState::fresh(kind);
        self.cursor = AnimationCursor::start();
        Transition { from, to: kind }
    }

    /// Requests a state through the transition policy.
    ///
    /// - A dash ignores everything except a new dash, which restarts it.
    /// - Requesting the current kind keeps the state and its data.
    /// - Jump asked to fall goes to JumpToFall instead.
    /// - JumpToFall ignores requests to fall.
    pub fn request(&mut self, kind: LocomotionKind) -> Option<Transition> {
        match (self.kind(), kind) {
            (LocomotionKind::DashAttack, LocomotionKind::DashAttack) => Some(self.enter(kind)),
            (LocomotionKind::DashAttack, _) => None,
            (current, requested) if current == requested => None,
            (LocomotionKind::Jump, LocomotionKind::Fall) => {
                Some(self.enter(LocomotionKind::JumpToFall))
            }
            (LocomotionKind::JumpToFall, LocomotionKind::Fall) => None,
            _ => Some(self.enter(kind)),
        }
    }

    /// Enters a fresh state unconditionally.
    pub fn hard_set(&mut self, kind: LocomotionKind) -> Transition {
        self.enter(kind)
    }

    /// Runs the current state's own exit logic.
    ///
    /// A finished dash hands over to Jump, Fall or Idle. JumpToFall exits to
    /// Fall according to the configured policy.
    pub fn run_hooks(&mut self, hook: HookContext, tuning: &MovementTuning) -> Option<Transition> {
        let current = self.current;
        match current {
            LocomotionState::DashAttack(dash) if dash.frame >= tuning.dash_total_frames => {
                let next = if hook.on_ground {
                    LocomotionKind::Idle
                } else if hook.falling {
                    LocomotionKind::Fall
                } else {
                    LocomotionKind::Jump
                };
                Some(self.hard_set(next))
            }
            LocomotionState::JumpToFall => {
                let done = match tuning.jump_to_fall_exit {
                    JumpToFallExit::Hold => false,
                    JumpToFallExit::AnimationEnd => self.cursor.finished(&self.clip()),
                    JumpToFallExit::AfterTicks(ticks) => self.cursor.elapsed() >= ticks,
                };
                done.then(|| self.hard_set(LocomotionKind::Fall))
            }
            _ => None,
        }
    }

    /// Closes the tick: records the previous kind and advances frame
    /// counters.
    pub fn end_tick(&mut self) {
        self.previous = self.kind();
        self.cursor.advance();
        if let Some(dash) = self.current.dash_mut() {
            dash.advance();
        }
    }
}
