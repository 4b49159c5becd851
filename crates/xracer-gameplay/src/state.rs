//! Top-level game state and the scroll velocity it allows.

use serde::{Deserialize, Serialize};

use crate::player::Player;

/// Current game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Menus are open; the world scrolls slowly behind them.
    #[default]
    InMenus,
    /// A run is in progress.
    Playing,
    /// The run is frozen.
    Paused,
    /// The player crashed and the run is over.
    Dead,
}

impl GameState {
    /// Check if the player, powerups and timers should advance.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if a new run can start from this state.
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::InMenus | Self::Dead)
    }

    /// Forward speed and lateral velocity handed to the streamer.
    ///
    /// Returns `(speed, steer)`.
    #[must_use]
    pub fn scroll_velocity(self, player: &Player, menu_scroll_speed: f32) -> (f32, f32) {
        match self {
            Self::Playing => (player.speed(), player.steer()),
            Self::InMenus => (menu_scroll_speed, 0.0),
            Self::Paused | Self::Dead => (0.0, 0.0),
        }
    }
}
