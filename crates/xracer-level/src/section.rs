//! Sections and the queue the streamer walks through.

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, LevelResult};
use crate::generator::{BlockGenerator, SectionGenerator};
use crate::powerup::PowerupSpawner;

/// Effects applied by gameplay when a section starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionEffects {
    /// Multiplies the player's base speed
    pub speed_increase: Option<f32>,
    /// Text shown when the speed increases
    pub speed_message: Option<String>,
    /// Text shown shortly after the section starts
    pub message: Option<String>,
}

/// One configured run of rows.
#[derive(Debug, Clone)]
pub struct Section {
    /// Display name
    pub name: String,
    /// Block generator for this section
    pub generator: SectionGenerator,
    /// Optional powerup spawner
    pub spawner: Option<PowerupSpawner>,
    /// Effects applied when the section starts
    pub effects: SectionEffects,
}

impl Section {
    /// Creates a section with no spawner and no effects.
    #[must_use]
    pub fn new(name: impl Into<String>, generator: impl Into<SectionGenerator>) -> Self {
        Self {
            name: name.into(),
            generator: generator.into(),
            spawner: None,
            effects: SectionEffects::default(),
        }
    }

    /// Attaches a powerup spawner.
    #[must_use]
    pub fn with_spawner(mut self, spawner: PowerupSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Sets the section-start effects.
    #[must_use]
    pub fn with_effects(mut self, effects: SectionEffects) -> Self {
        self.effects = effects;
        self
    }
}

/// Ordered sections with a cursor.
///
/// Advancing past the last section wraps to `start_index`, never to 0, so
/// sections before `start_index` only ever run once.
#[derive(Debug, Clone)]
pub struct SectionQueue {
    sections: Vec<Section>,
    start_index: usize,
    current: usize,
}

impl SectionQueue {
    /// Creates a queue positioned at `start_index`.
    pub fn new(sections: Vec<Section>, start_index: usize) -> LevelResult<Self> {
        if sections.is_empty() {
            return Err(LevelError::NoSections);
        }
        if start_index >= sections.len() {
            return Err(LevelError::StartSectionOutOfRange {
                index: start_index,
                len: sections.len(),
            });
        }
        Ok(Self {
            sections,
            start_index,
            current: start_index,
        })
    }

    /// Index sections loop back to.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index of the active section.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The active section.
    #[must_use]
    pub fn current(&self) -> &Section {
        &self.sections[self.current]
    }

    /// The active section, mutably.
    pub fn current_mut(&mut self) -> &mut Section {
        &mut self.sections[self.current]
    }

    /// Section at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// All sections in order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false; a queue cannot be built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Moves to the next section and returns its index.
    pub fn advance(&mut self) -> usize {
        let next = self.current + 1;
        self.current = if next >= self.sections.len() {
            self.start_index
        } else {
            next
        };
        self.current
    }

    /// Jumps to `index`, clamped to the last section.
    pub fn set_current(&mut self, index: usize) {
        self.current = index.min(self.sections.len() - 1);
    }

    /// Resets every generator.
    pub fn reset_all(&mut self) {
        for section in &mut self.sections {
            section.generator.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ConstantGenerator;
    use xracer_common::BlockKindId;

    fn section(name: &str) -> Section {
        Section::new(
            name,
            ConstantGenerator::new(BlockKindId::new(0), 1).expect("valid"),
        )
    }

    #[test]
    fn test_advance_wraps_to_start_index() {
        let mut queue = SectionQueue::new(
            vec![section("intro"), section("a"), section("b")],
            1,
        )
        .expect("valid");

        queue.set_current(0);
        assert_eq!(queue.advance(), 1);
        assert_eq!(queue.advance(), 2);
        assert_eq!(queue.advance(), 1);
        assert_eq!(queue.current().name, "a");
    }

    #[test]
    fn test_single_section_loops_on_itself() {
        let mut queue = SectionQueue::new(vec![section("only")], 0).expect("valid");
        assert_eq!(queue.advance(), 0);
        assert_eq!(queue.advance(), 0);
    }

    #[test]
    fn test_empty_queue_rejected() {
        assert!(matches!(
            SectionQueue::new(Vec::new(), 0),
            Err(LevelError::NoSections)
        ));
    }

    #[test]
    fn test_start_index_out_of_range_rejected() {
        assert!(matches!(
            SectionQueue::new(vec![section("a")], 1),
            Err(LevelError::StartSectionOutOfRange { index: 1, len: 1 })
        ));
    }
}
