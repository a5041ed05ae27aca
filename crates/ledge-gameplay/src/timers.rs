//! Press buffers, coyote timers and the jump-hold counter.
//!
//! Every window is a [`Countdown`]: seeded to its full length by an event,
//! decremented once per tick otherwise, and zeroed when the action it guards
//! executes.

use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, ControllerResult};

/// Tick countdown over `[0, window]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
    window: u32,
}

impl Countdown {
    /// Creates an inactive countdown. A zero window is rejected.
    pub fn new(field: &'static str, window: u32) -> ControllerResult<Self> {
        if window == 0 {
            return Err(ControllerError::InvalidTuning {
                field,
                reason: "window must be at least one tick".to_string(),
            });
        }
        Ok(Self {
            remaining: 0,
            window,
        })
    }

    /// Ticks left before the window closes.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Full window length.
    #[must_use]
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Whether any ticks remain.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Resets to the full window.
    pub fn seed(&mut self) {
        self.remaining = self.window;
    }

    /// Decrements by one, saturating at zero.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Closes the window immediately.
    pub fn consume(&mut self) {
        self.remaining = 0;
    }

    /// Seeds on `event`, ticks otherwise.
    pub fn seed_or_tick(&mut self, event: bool) {
        if event {
            self.seed();
        } else {
            self.tick();
        }
    }
}

/// Every timing window a character tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTimers {
    /// Jump press buffer
    pub jump_buffer: Countdown,
    /// Dash press buffer
    pub dash_buffer: Countdown,
    /// Grace after leaving the ground
    pub ground_coyote: Countdown,
    /// Grace after leaving a wall slide
    pub wall_coyote: Countdown,
    /// Upward re-application budget after a jump
    pub jump_hold: Countdown,
}

impl InputTimers {
    /// Creates all timers inactive.
    pub fn new(
        jump_buffer: u32,
        dash_buffer: u32,
        ground_coyote: u32,
        wall_coyote: u32,
        jump_hold: u32,
    ) -> ControllerResult<Self> {
        Ok(Self {
            jump_buffer: Countdown::new("jump_buffer_ticks", jump_buffer)?,
            dash_buffer: Countdown::new("dash_buffer_ticks", dash_buffer)?,
            ground_coyote: Countdown::new("ground_coyote_ticks", ground_coyote)?,
            wall_coyote: Countdown::new("wall_coyote_ticks", wall_coyote)?,
            jump_hold: Countdown::new("jump_hold_ticks", jump_hold)?,
        })
    }

    /// Press buffers: seed on a press edge, tick otherwise.
    pub fn update_buffers(&mut self, jump_pressed: bool, dash_pressed: bool) {
        self.jump_buffer.seed_or_tick(jump_pressed);
        self.dash_buffer.seed_or_tick(dash_pressed);
    }

    /// Coyote timers. Ground and wall grace are mutually exclusive: holding
    /// one contact zeroes the other's timer.
    pub fn update_coyote(&mut self, on_ground: bool, wall_sliding: bool) {
        if on_ground {
            self.ground_coyote.seed();
            self.wall_coyote.consume();
        } else {
            self.ground_coyote.tick();
        }

        if wall_sliding {
            self.wall_coyote.seed();
            self.ground_coyote.consume();
        } else {
            self.wall_coyote.tick();
        }
    }

    /// Iterates over every countdown, for invariant checks.
    pub fn iter(&self) -> impl Iterator<Item = &Countdown> {
        [
            &self.jump_buffer,
            &self.dash_buffer,
            &self.ground_coyote,
            &self.wall_coyote,
            &self.jump_hold,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timers() -> InputTimers {
        InputTimers::new(8, 8, 6, 6, 10).unwrap()
    }

    #[test]
    fn test_countdown_lifecycle() {
        let mut countdown = Countdown::new("test", 3).unwrap();
        assert!(!countdown.is_active());

        countdown.seed();
        assert_eq!(countdown.remaining(), 3);
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.remaining(), 1);
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.remaining(), 0);

        countdown.seed();
        countdown.consume();
        assert!(!countdown.is_active());
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = Countdown::new("jump_buffer_ticks", 0).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::InvalidTuning {
                field: "jump_buffer_ticks",
                ..
            }
        ));
    }

    #[test]
    fn test_coyote_timers_exclusive() {
        let mut t = timers();
        t.update_coyote(false, true);
        assert_eq!(t.wall_coyote.remaining(), 6);

        t.update_coyote(true, false);
        assert_eq!(t.ground_coyote.remaining(), 6);
        assert_eq!(t.wall_coyote.remaining(), 0);

        t.update_coyote(false, true);
        assert_eq!(t.ground_coyote.remaining(), 0);
        assert_eq!(t.wall_coyote.remaining(), 6);
    }

    #[test]
    fn test_buffer_seeds_on_edge_only() {
        let mut t = timers();
        t.update_buffers(true, false);
        assert_eq!(t.jump_buffer.remaining(), 8);
        t.update_buffers(false, false);
        assert_eq!(t.jump_buffer.remaining(), 7);
        assert_eq!(t.dash_buffer.remaining(), 0);
    }

    proptest! {
        #[test]
        fn prop_timers_stay_in_range(
            steps in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 0..200)
        ) {
            let mut t = timers();
            for (jump, dash, ground, wall, consume) in steps {
                t.update_buffers(jump, dash);
                t.update_coyote(ground, wall);
                if consume {
                    t.jump_buffer.consume();
                    t.ground_coyote.consume();
                }
                for countdown in t.iter() {
                    prop_assert!(countdown.remaining() <= countdown.window());
                }
            }
        }
    }
}
