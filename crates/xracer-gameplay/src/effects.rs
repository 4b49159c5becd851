//! Section-start effects: speed increases and delayed messages.

use tracing::debug;
use xracer_level::SectionEffects;

use crate::events::GameEvent;
use crate::player::Player;

/// Seconds between a section starting and its message appearing.
pub const MESSAGE_DELAY: f32 = 1.0;

const DEFAULT_SPEED_MESSAGE: &str = "Speed Increased!";

#[derive(Debug, Clone, PartialEq)]
struct PendingMessage {
    remaining: f32,
    message: String,
}

/// Applies section effects and schedules their messages.
#[derive(Debug, Clone)]
pub struct SectionDirector {
    message_delay: f32,
    pending: Vec<PendingMessage>,
}

impl Default for SectionDirector {
    fn default() -> Self {
        Self::new(MESSAGE_DELAY)
    }
}

impl SectionDirector {
    /// Creates a director that holds messages back for `message_delay` seconds.
    #[must_use]
    pub fn new(message_delay: f32) -> Self {
        Self {
            message_delay: message_delay.max(0.0),
            pending: Vec::new(),
        }
    }

    /// Applies `effects` to `player` and returns the events to show now.
    pub fn section_started(&mut self, effects: &SectionEffects, player: &mut Player) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(factor) = effects.speed_increase {
            player.increase_speed(factor);
            debug!("Speed x{factor}, now {}", player.base_speed());
            let text = effects
                .speed_message
                .clone()
                .unwrap_or_else(|| DEFAULT_SPEED_MESSAGE.to_string());
            events.push(GameEvent::info(text));
        }
        if let Some(message) = &effects.message {
            self.pending.push(PendingMessage {
                remaining: self.message_delay,
                message: message.clone(),
            });
        }
        events
    }

    /// Advances timers and returns messages that came due.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut due = Vec::new();
        self.pending.retain_mut(|pending| {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                due.push(GameEvent::info(std::mem::take(&mut pending.message)));
                false
            } else {
                true
            }
        });
        due
    }

    /// Number of messages still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops all waiting messages.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerConfig;

    #[test]
    fn test_speed_increase_applies_immediately() {
        let mut player = Player::new(PlayerConfig::default());
        let mut director = SectionDirector::default();
        let effects = SectionEffects {
            speed_increase: Some(1.25),
            ..SectionEffects::default()
        };
        let events = director.section_started(&effects, &mut player);
        assert_eq!(player.base_speed(), 100.0);
        assert_eq!(events, vec![GameEvent::info("Speed Increased!")]);
    }

    #[test]
    fn test_message_is_delayed() {
        let mut player = Player::new(PlayerConfig::default());
        let mut director = SectionDirector::default();
        let effects = SectionEffects {
            message: Some("Watch out".to_string()),
            ..SectionEffects::default()
        };
        assert!(director.section_started(&effects, &mut player).is_empty());
        assert!(director.update(0.5).is_empty());
        assert_eq!(director.update(0.5), vec![GameEvent::info("Watch out")]);
        assert_eq!(director.pending(), 0);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut player = Player::new(PlayerConfig::default());
        let mut director = SectionDirector::default();
        let effects = SectionEffects {
            message: Some("later".to_string()),
            ..SectionEffects::default()
        };
        director.section_started(&effects, &mut player);
        director.clear();
        assert!(director.update(2.0).is_empty());
    }
}
