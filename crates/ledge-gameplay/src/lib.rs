//! # Ledge Gameplay
//!
//! Character controller for the Ledge platformer.
//!
//! This crate turns key input into deterministic motion through a tile
//! world, one fixed tick at a time:
//! - Collision box and probe sampling
//! - Tile-world query contract
//! - Input bindings, press buffers and coyote timers
//! - Acceleration model and penetration resolver
//! - Locomotion state machine with animation cursor
//! - Dash attack and grapple movement
//! - Particle descriptors for the effects system
//!
//! Rendering, scheduling, the tile map and the effects system stay outside;
//! they are reached through traits passed into [`Character::tick`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod animation;
pub mod collision_box;
pub mod dash;
pub mod error;
pub mod grapple;
pub mod input;
pub mod particles;
pub mod physics;
pub mod player;
pub mod state;
pub mod timers;
pub mod tuning;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::*;
    pub use crate::collision_box::*;
    pub use crate::dash::*;
    pub use crate::error::*;
    pub use crate::grapple::*;
    pub use crate::input::*;
    pub use crate::particles::*;
    pub use crate::physics::*;
    pub use crate::player::*;
    pub use crate::state::*;
    pub use crate::timers::*;
    pub use crate::tuning::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use ledge_common::MaterialId;

    #[test]
    fn test_character_runs_across_flat_ground() {
        let mut world = MockTiles::new(16);
        world.set_ground_level(160, MaterialId::STONE);
        let mut character = Character::spawn(
            Vec2::new(0.0, 117.0),
            MovementTuning::default(),
            Controls::default(),
            &world,
            3,
        )
        .unwrap();
        let mut keyboard = KeyboardState::new();
        let mut particles = NullEmitter;

        keyboard.press(KeyCode::D);
        for _ in 0..30 {
            character.tick(TickContext::new(&mut keyboard, &world, &mut particles));
            keyboard.end_tick();
        }

        assert!(character.position().x > 30.0);
        assert_eq!(character.position().y, 117.0);
        assert_eq!(character.kind(), LocomotionKind::Running);
    }
}
