//! Fixed-timestep accumulator.
//!
//! Converts variable frame times into a whole number of fixed simulation
//! ticks, carrying the remainder to the next frame.

/// Most ticks run for a single frame.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// Unsimulated time carried between frames
    accumulator: f32,
    /// Length of one tick in seconds
    fixed_dt: f32,
    /// Maximum delta accepted from one frame
    max_dt: f32,
    /// Ticks handed out so far
    total_ticks: u64,
}

impl FixedStep {
    /// Creates an accumulator for ticks of `fixed_dt` seconds.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            accumulator: 0.0,
            fixed_dt: fixed_dt.max(0.001),
            max_dt: 0.25,
            total_ticks: 0,
        }
    }

    /// Length of one tick in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Ticks handed out since creation.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Accumulate frame time.
    /// Returns the number of fixed ticks that should be simulated.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, self.max_dt);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind after the cap: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.total_ticks += u64::from(count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_ticks() {
        let mut step = FixedStep::new(0.1);
        assert_eq!(step.accumulate(0.25), 2);
        assert_eq!(step.accumulate(0.06), 1);
        assert_eq!(step.total_ticks(), 3);
    }

    #[test]
    fn test_short_frames_carry_over() {
        let mut step = FixedStep::new(1.0 / 60.0);
        assert_eq!(step.accumulate(1.0 / 240.0), 0);
        for _ in 0..11 {
            step.accumulate(1.0 / 240.0);
        }
        assert!((2..=3).contains(&step.total_ticks()));
    }

    #[test]
    fn test_spiral_of_death_cap() {
        let mut step = FixedStep::new(0.01);
        // Clamped to 0.25s, then capped at ten ticks with the backlog dropped
        assert_eq!(step.accumulate(5.0), MAX_TICKS_PER_FRAME);
        assert_eq!(step.accumulate(0.0), 0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut step = FixedStep::new(0.1);
        assert_eq!(step.accumulate(-1.0), 0);
        assert_eq!(step.accumulate(0.1), 1);
    }
}
