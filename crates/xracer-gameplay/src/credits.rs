//! Credits earned during a single race.

use serde::{Deserialize, Serialize};

/// Credits collected this race, scaled by the purchased multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCredits {
    multiplier: f32,
    earned: u64,
}

impl Default for RaceCredits {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RaceCredits {
    /// Starts a race with the given multiplier.
    #[must_use]
    pub fn new(multiplier: f32) -> Self {
        Self {
            multiplier: multiplier.max(0.0),
            earned: 0,
        }
    }

    /// Clears the total and applies a new multiplier.
    pub fn reset(&mut self, multiplier: f32) {
        *self = Self::new(multiplier);
    }

    /// Awards `credits`, rounded up after the multiplier. Returns what was added.
    pub fn award(&mut self, credits: u32) -> u64 {
        let scaled = (f64::from(credits) * f64::from(self.multiplier)).ceil();
        let added = scaled.max(0.0) as u64;
        self.earned = self.earned.saturating_add(added);
        added
    }

    /// Credits earned so far.
    #[must_use]
    pub const fn earned(&self) -> u64 {
        self.earned
    }

    /// Active multiplier.
    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_rounds_up() {
        let mut credits = RaceCredits::new(1.5);
        assert_eq!(credits.award(101), 152);
        assert_eq!(credits.award(200), 300);
        assert_eq!(credits.earned(), 452);
    }

    #[test]
    fn test_reset_clears() {
        let mut credits = RaceCredits::default();
        credits.award(10);
        credits.reset(2.0);
        assert_eq!(credits.earned(), 0);
        assert_eq!(credits.award(10), 20);
    }
}
