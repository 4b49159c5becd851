//! The player's ship: forward speed and smoothed steering.

use serde::{Deserialize, Serialize};
use xracer_common::lerp;

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Forward speed at the start of a run
    pub speed: f32,
    /// Lateral speed at full input
    pub steer_speed: f32,
    /// How quickly steering follows input (per second)
    pub tilt_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 80.0,
            steer_speed: 8.0,
            tilt_speed: 10.0,
        }
    }
}

/// The player.
///
/// The world moves, the player doesn't: [`Player::speed`] and
/// [`Player::steer`] are what the streamer scrolls by.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    /// Base forward speed, raised by section effects
    base_speed: f32,
    /// Current lateral velocity
    steer: f32,
    /// Temporary multiplier driven by powerups
    speed_multiplier: f32,
    crashed: bool,
}

impl Player {
    /// Creates a player at the configured starting speed.
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        let base_speed = config.speed;
        Self {
            config,
            base_speed,
            steer: 0.0,
            speed_multiplier: 1.0,
            crashed: false,
        }
    }

    /// Restores the starting speed and clears steering and effects.
    pub fn reset(&mut self) {
        self.base_speed = self.config.speed;
        self.steer = 0.0;
        self.speed_multiplier = 1.0;
        self.crashed = false;
    }

    /// Effective forward speed; zero once crashed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        if self.crashed {
            0.0
        } else {
            self.base_speed * self.speed_multiplier
        }
    }

    /// Base forward speed without the powerup multiplier.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Current lateral velocity.
    #[must_use]
    pub const fn steer(&self) -> f32 {
        self.steer
    }

    /// Current powerup multiplier.
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Sets the powerup multiplier.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    /// Multiplies the base speed.
    pub fn increase_speed(&mut self, factor: f32) {
        self.base_speed *= factor;
    }

    /// Check if the player has crashed.
    #[must_use]
    pub const fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// Stops the player for good.
    pub fn crash(&mut self) {
        self.crashed = true;
        self.steer = 0.0;
    }

    /// Eases steering toward `input` (-1 left, 1 right).
    ///
    /// Steering gets slightly stronger while the speed multiplier is raised.
    pub fn update(&mut self, input: f32, dt: f32) {
        if self.crashed {
            return;
        }
        let steer_speed = self.config.steer_speed * lerp(self.speed_multiplier, 1.0, 0.01);
        self.steer = lerp(self.steer, steer_speed * input, self.config.tilt_speed * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_includes_multiplier() {
        let mut player = Player::new(PlayerConfig::default());
        assert_eq!(player.speed(), 80.0);
        player.set_speed_multiplier(1.5);
        assert_eq!(player.speed(), 120.0);
        player.increase_speed(1.1);
        assert!((player.base_speed() - 88.0).abs() < 1e-4);
    }

    #[test]
    fn test_steering_eases_toward_input() {
        let mut player = Player::new(PlayerConfig::default());
        player.update(1.0, 0.05);
        // halfway after 0.05 s at tilt speed 10
        assert!((player.steer() - 4.0).abs() < 1e-4);
        for _ in 0..10 {
            player.update(1.0, 0.1);
        }
        assert!((player.steer() - 8.0).abs() < 1e-4);
        player.update(-1.0, 1.0);
        assert!((player.steer() + 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_crash_stops_player() {
        let mut player = Player::new(PlayerConfig::default());
        player.update(1.0, 1.0);
        player.crash();
        assert_eq!(player.speed(), 0.0);
        assert_eq!(player.steer(), 0.0);
        player.update(1.0, 1.0);
        assert_eq!(player.steer(), 0.0);

        player.reset();
        assert!(!player.is_crashed());
        assert_eq!(player.speed(), 80.0);
    }
}
