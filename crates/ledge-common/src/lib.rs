//! # Ledge Common
//!
//! Common types and shared abstractions for the Ledge platformer.
//!
//! This crate provides foundational types used across the Ledge crates:
//! - Coordinate types (pixel, tile)
//! - ID types (MaterialId, GrappleId)
//! - Error types for level and input-script loading
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
