//! # XRacer Gameplay
//!
//! Gameplay systems for XRacer.
//!
//! This crate drives a run on top of the world streamer:
//! - Game state and the scroll velocity each state allows
//! - Player speed and steering
//! - Powerup timelines
//! - Race credits and record tracking
//! - Shop items bought with banked credits
//! - Section effects (speed increases, delayed messages)
//! - Event bus for HUD notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod credits;
pub mod effects;
pub mod events;
pub mod player;
pub mod powerups;
pub mod progress;
pub mod record;
pub mod session;
pub mod shop;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::credits::*;
    pub use crate::effects::*;
    pub use crate::events::*;
    pub use crate::player::*;
    pub use crate::powerups::*;
    pub use crate::progress::*;
    pub use crate::record::*;
    pub use crate::session::*;
    pub use crate::shop::*;
    pub use crate::state::*;
}

pub use prelude::*;
