//! Event bus for notifying presentation layers (HUD, popups, audio).

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use xracer_level::{SectionObserver, SectionStarted};

use crate::state::GameState;

/// Seconds an info popup stays on screen.
pub const INFO_DURATION: f32 = 2.0;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Game state changed
    StateChanged {
        /// Previous state
        from: GameState,
        /// New state
        to: GameState,
    },
    /// A level section started
    SectionStarted {
        /// Section index
        index: usize,
        /// Section name
        name: String,
    },
    /// Temporary on-screen message
    Info {
        /// Text
        message: String,
        /// Seconds on screen
        duration: f32,
    },
    /// On-screen message with a countdown bar
    Countdown {
        /// Text
        message: String,
        /// Seconds the countdown runs
        duration: f32,
        /// Fade time
        fade: f32,
    },
    /// The player passed the record distance for the first time this run
    NewRecord {
        /// Distance at the moment the record broke
        distance: f32,
    },
    /// A powerup was collected
    PowerupCollected {
        /// Powerup text
        name: String,
    },
    /// The active powerup finished
    PowerupCompleted {
        /// Powerup text
        name: String,
    },
    /// Credits were awarded this race
    CreditsAwarded {
        /// Credits after the multiplier
        amount: u64,
    },
    /// The run ended
    GameOver {
        /// Distance travelled
        distance: f32,
        /// Credits collected during the run
        credits: u64,
        /// Whether the run beat the previous record
        new_record: bool,
    },
}

impl GameEvent {
    /// An info popup with the default duration.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
            duration: INFO_DURATION,
        }
    }
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        if self.sender.try_send(event).is_err() {
            tracing::warn!("Event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

/// Forwards streamer section announcements into a channel.
#[derive(Debug, Clone)]
pub struct SectionForwarder {
    sender: Sender<SectionStarted>,
}

impl SectionForwarder {
    /// Creates a forwarder and the receiver it feeds.
    #[must_use]
    pub fn channel() -> (Self, Receiver<SectionStarted>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl SectionObserver for SectionForwarder {
    fn on_section_started(&mut self, event: &SectionStarted) {
        // the receiver lives as long as the session; a send error only means it is gone
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(4);
        bus.publish(GameEvent::info("hello"));
        bus.publish(GameEvent::NewRecord { distance: 10.0 });
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            GameEvent::Info {
                message: "hello".to_string(),
                duration: INFO_DURATION
            }
        );
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        bus.publish(GameEvent::info("a"));
        bus.publish(GameEvent::info("b"));
        assert_eq!(bus.drain().len(), 1);
    }

    #[test]
    fn test_forwarder_delivers() {
        let (mut forwarder, rx) = SectionForwarder::channel();
        forwarder.on_section_started(&SectionStarted {
            index: 2,
            name: "gates".to_string(),
        });
        let event = rx.try_recv().expect("event");
        assert_eq!(event.index, 2);
    }
}
