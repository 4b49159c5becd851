//! Record distance tracking during a run.

/// Tracks whether the current run beat the stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTracker {
    /// Record at the start of the run
    target: f32,
    /// Best distance seen, including this run
    record: f32,
    broke_record: bool,
    notified: bool,
}

impl RecordTracker {
    /// Starts tracking a run against `stored_record`.
    ///
    /// With no previous record there is nothing to announce.
    #[must_use]
    pub fn start_run(stored_record: f32) -> Self {
        Self {
            target: stored_record,
            record: stored_record,
            broke_record: false,
            notified: stored_record <= 0.0,
        }
    }

    /// Feeds the current distance.
    ///
    /// Returns `Some(distance)` the first time the old record is passed.
    pub fn update(&mut self, distance: f32) -> Option<f32> {
        if distance <= self.target {
            return None;
        }
        self.broke_record = true;
        self.record = self.record.max(distance);
        if self.notified {
            None
        } else {
            self.notified = true;
            Some(distance)
        }
    }

    /// Record the run is measured against.
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.target
    }

    /// Best distance so far.
    #[must_use]
    pub const fn record(&self) -> f32 {
        self.record
    }

    /// Check if this run went past the old record.
    #[must_use]
    pub const fn broke_record(&self) -> bool {
        self.broke_record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_fires_once() {
        let mut tracker = RecordTracker::start_run(100.0);
        assert_eq!(tracker.update(50.0), None);
        assert_eq!(tracker.update(100.5), Some(100.5));
        assert_eq!(tracker.update(150.0), None);
        assert!(tracker.broke_record());
        assert_eq!(tracker.record(), 150.0);
        assert_eq!(tracker.target(), 100.0);
    }

    #[test]
    fn test_first_run_is_silent() {
        let mut tracker = RecordTracker::start_run(0.0);
        assert_eq!(tracker.update(10.0), None);
        assert!(tracker.broke_record());
        assert_eq!(tracker.record(), 10.0);
    }

    #[test]
    fn test_short_run_keeps_record() {
        let mut tracker = RecordTracker::start_run(500.0);
        tracker.update(20.0);
        assert!(!tracker.broke_record());
        assert_eq!(tracker.record(), 500.0);
    }
}
