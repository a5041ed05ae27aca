//! Animation clips and the per-state animation cursor.
//!
//! The controller only tracks which clip and frame are showing; drawing is
//! left to the renderer through [`SpriteFrame`].

use ledge_common::PixelCoord;
use serde::{Deserialize, Serialize};

use crate::state::LocomotionKind;

/// Static description of a sprite-sheet animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationClip {
    /// Sheet name
    pub name: &'static str,
    /// Number of frames
    pub frames: u32,
    /// Simulation ticks each frame stays on screen
    pub ticks_per_frame: u32,
    /// Whether the clip wraps around
    pub looping: bool,
}

impl AnimationClip {
    const fn new(name: &'static str, frames: u32, ticks_per_frame: u32, looping: bool) -> Self {
        Self {
            name,
            frames,
            ticks_per_frame,
            looping,
        }
    }

    /// Total ticks of one pass through the clip.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.frames * self.ticks_per_frame
    }
}

/// Clip played for each locomotion kind.
#[must_use]
pub fn clip_for(kind: LocomotionKind) -> AnimationClip {
    match kind {
        LocomotionKind::Idle => AnimationClip::new("idle", 4, 10, true),
        LocomotionKind::Running => AnimationClip::new("run", 8, 5, true),
        LocomotionKind::Jump => AnimationClip::new("jump", 2, 6, false),
        LocomotionKind::JumpToFall => AnimationClip::new("jump_to_fall", 3, 4, false),
        LocomotionKind::Fall => AnimationClip::new("fall", 2, 6, true),
        LocomotionKind::WallSlide => AnimationClip::new("wall_slide", 2, 8, true),
        LocomotionKind::DashAttack => AnimationClip::new("dash_attack", 8, 3, false),
    }
}

/// Playback position inside a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationCursor {
    /// Ticks since the clip started
    elapsed: u32,
}

impl AnimationCursor {
    /// Cursor at the first frame.
    #[must_use]
    pub const fn start() -> Self {
        Self { elapsed: 0 }
    }

    /// Ticks since the clip started.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Advances by one tick.
    pub fn advance(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    /// Frame index currently shown.
    #[must_use]
    pub fn frame(&self, clip: &AnimationClip) -> u32 {
        let tick_frame = self.elapsed / clip.ticks_per_frame.max(1);
        if clip.frames == 0 {
            0
        } else if clip.looping {
            tick_frame % clip.frames
        } else {
            tick_frame.min(clip.frames - 1)
        }
    }

    /// A non-looping clip has played through once.
    #[must_use]
    pub fn finished(&self, clip: &AnimationClip) -> bool {
        !clip.looping && self.elapsed >= clip.duration()
    }
}

impl Default for AnimationCursor {
    fn default() -> Self {
        Self::start()
    }
}

/// Draw descriptor handed to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteFrame {
    /// Clip being shown
    pub clip: AnimationClip,
    /// Frame index in the clip
    pub frame: u32,
    /// Mirror horizontally (facing left)
    pub flip_x: bool,
    /// Floored character position
    pub anchor: PixelCoord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looping_clip_wraps() {
        let clip = clip_for(LocomotionKind::Running);
        let mut cursor = AnimationCursor::start();
        for _ in 0..clip.duration() {
            cursor.advance();
        }
        assert_eq!(cursor.frame(&clip), 0);
        assert!(!cursor.finished(&clip));
    }

    #[test]
    fn test_one_shot_clip_holds_last_frame() {
        let clip = clip_for(LocomotionKind::JumpToFall);
        let mut cursor = AnimationCursor::start();
        for _ in 0..100 {
            cursor.advance();
        }
        assert_eq!(cursor.frame(&clip), clip.frames - 1);
        assert!(cursor.finished(&clip));
    }

    #[test]
    fn test_frame_timing() {
        let clip = clip_for(LocomotionKind::Idle);
        let mut cursor = AnimationCursor::start();
        for _ in 0..clip.ticks_per_frame {
            cursor.advance();
        }
        assert_eq!(cursor.frame(&clip), 1);
    }
}
