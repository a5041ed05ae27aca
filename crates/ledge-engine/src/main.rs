//! # Ledge
//!
//! Headless harness for the Ledge platformer controller.
//!
//! Loads a TOML configuration (path as the first argument, `ledge.toml` by
//! default), an ASCII level and a key script, then steps the character at a
//! fixed tick rate under jittered frame times and logs what happened.
//! Set `RUST_LOG=ledge_gameplay=debug` to see every state transition.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod level;
mod script;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ledge=info".parse()?))
        .init();

    info!("Ledge {} starting", env!("CARGO_PKG_VERSION"));

    app::run()?;

    info!("Ledge shutdown complete");
    Ok(())
}
