//! # XRacer Common
//!
//! Common types, utilities, and shared abstractions for XRacer.
//!
//! This crate provides foundational types used across all XRacer subsystems:
//! - ID types (BlockId, BlockKindId)
//! - World-space helpers (wrapping, interpolation)
//! - The injectable random source
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod random;
pub mod space;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::random::*;
    pub use crate::space::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_id_allocation() {
        let mut alloc = BlockIdAllocator::default();
        let a = alloc.next_id();
        let b = alloc.next_id();
        assert_ne!(a, b);
        assert!(a.is_valid());
        assert!(!BlockId::NULL.is_valid());
    }

    #[test]
    fn test_repeat_wraps_into_range() {
        assert!((repeat(-10.0, 64.0) - 54.0).abs() < 1e-5);
        assert!((repeat(130.0, 64.0) - 2.0).abs() < 1e-5);
        assert!(repeat(64.0, 64.0).abs() < 1e-5);
    }

    #[test]
    fn test_sequence_random_replays() {
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 0.99]);
        assert_eq!(rng.index(4), 0);
        assert_eq!(rng.index(4), 2);
        assert_eq!(rng.index(4), 3);
        // wraps around
        assert_eq!(rng.range_i32(-8, 8), -8);
    }

    proptest! {
        #[test]
        fn prop_repeat_stays_in_range(value in -1.0e5_f32..1.0e5, length in 0.5_f32..512.0) {
            let wrapped = repeat(value, length);
            prop_assert!(wrapped >= 0.0);
            prop_assert!(wrapped < length);
        }
    }
}
