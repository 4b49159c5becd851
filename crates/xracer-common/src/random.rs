//! Injectable random source.
//!
//! Every random draw in the level and gameplay crates goes through
//! [`RandomSource`], so tests can replay exact sequences.

/// A source of uniformly distributed random values.
pub trait RandomSource {
    /// Returns an integer in `[low, high)`. Returns `low` when the range is empty.
    fn range_i32(&mut self, low: i32, high: i32) -> i32;

    /// Returns an index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Returns a value in `[0, 1)`.
    fn unit(&mut self) -> f32;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        (**self).range_i32(low, high)
    }

    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }

    fn unit(&mut self) -> f32 {
        (**self).unit()
    }
}

/// Default random source backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct FastRandom {
    rng: fastrand::Rng,
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl FastRandom {
    /// Creates a source seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a reproducible source.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl RandomSource for FastRandom {
    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.i32(low..high)
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.usize(0..len.max(1))
    }

    fn unit(&mut self) -> f32 {
        self.rng.f32()
    }
}

/// Replays a fixed list of unit values in order, wrapping at the end.
///
/// Integer draws are derived from the unit value, so `0.0` always picks the
/// lowest option and values close to `1.0` pick the highest.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    /// Creates a source replaying `values`. An empty list behaves as `[0.0]`.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same value.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of draws made so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }

    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}

impl RandomSource for SequenceRandom {
    fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high - low) as f32;
        low + (self.next_unit() * span).floor() as i32
    }

    fn index(&mut self, len: usize) -> usize {
        let len = len.max(1);
        ((self.next_unit() * len as f32).floor() as usize).min(len - 1)
    }

    fn unit(&mut self) -> f32 {
        self.next_unit()
    }
}
