//! Persistent player progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where record distance, credit totals and shop inventory live between runs.
pub trait ProgressStore {
    /// Best distance ever travelled.
    fn record_distance(&self) -> f32;

    /// Stores a new best distance.
    fn set_record_distance(&mut self, distance: f32);

    /// Credits available to spend.
    fn total_credits(&self) -> u64;

    /// Stores the credit total.
    fn set_total_credits(&mut self, credits: u64);

    /// How many of shop item `id` the player owns.
    fn item_count(&self, id: &str) -> u32;

    /// Stores the owned count of shop item `id`.
    fn set_item_count(&mut self, id: &str, count: u32);

    /// Id of the selected ship skin.
    fn active_skin(&self) -> Option<&str>;

    /// Selects a ship skin.
    fn set_active_skin(&mut self, id: &str);
}

/// Progress kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryProgress {
    /// Best distance
    pub record_distance: f32,
    /// Credit total
    pub total_credits: u64,
    /// Owned shop items by id
    pub items: BTreeMap<String, u32>,
    /// Selected ship skin
    pub active_skin: Option<String>,
}

impl ProgressStore for MemoryProgress {
    fn record_distance(&self) -> f32 {
        self.record_distance
    }

    fn set_record_distance(&mut self, distance: f32) {
        self.record_distance = distance;
    }

    fn total_credits(&self) -> u64 {
        self.total_credits
    }

    fn set_total_credits(&mut self, credits: u64) {
        self.total_credits = credits;
    }

    fn item_count(&self, id: &str) -> u32 {
        self.items.get(id).copied().unwrap_or(0)
    }

    fn set_item_count(&mut self, id: &str, count: u32) {
        if count == 0 {
            self.items.remove(id);
        } else {
            self.items.insert(id.to_string(), count);
        }
    }

    fn active_skin(&self) -> Option<&str> {
        self.active_skin.as_deref()
    }

    fn set_active_skin(&mut self, id: &str) {
        self.active_skin = Some(id.to_string());
    }
}
