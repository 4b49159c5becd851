//! World-space helpers.
//!
//! The world uses x for lateral offset, y for height and z for depth (distance
//! ahead of the player). The player never moves; the world scrolls toward it.

/// Wraps `value` into `[0, length)`.
#[must_use]
pub fn repeat(value: f32, length: f32) -> f32 {
    let wrapped = value - (value / length).floor() * length;
    // floor() can leave `length` itself behind for tiny negative inputs
    if wrapped >= length {
        0.0
    } else {
        wrapped.max(0.0)
    }
}

/// Linear interpolation between `a` and `b`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// `ceil(value)` as a count, never negative.
#[must_use]
pub fn ceil_count(value: f32) -> usize {
    if value <= 0.0 {
        0
    } else {
        value.ceil() as usize
    }
}
