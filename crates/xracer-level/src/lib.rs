//! # XRacer Level
//!
//! Procedural level streaming for XRacer.
//!
//! This crate handles:
//! - Block catalog and spawn slots
//! - Block generators (constant, random pick, fixed sequence)
//! - Powerup placement inside generated blocks
//! - The section queue and its looping rules
//! - The world streamer that keeps the horizon covered
//! - Level configuration loading and validation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod block;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod powerup;
pub mod section;
pub mod streamer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::block::*;
    pub use crate::catalog::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::generator::*;
    pub use crate::powerup::*;
    pub use crate::section::*;
    pub use crate::streamer::*;
}

pub use prelude::*;
