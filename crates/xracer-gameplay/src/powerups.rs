//! Collected powerups and the speed multiplier timelines they drive.

use tracing::info;
use xracer_common::lerp;
use xracer_level::PowerupKind;

use crate::events::GameEvent;
use crate::player::Player;

/// Multiplier curve: ease from 1 to `target`, hold, ease back to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierRamp {
    /// Multiplier at full effect
    pub target: f32,
    /// Seconds to reach `target`
    pub fade_in: f32,
    /// Seconds at `target`
    pub hold: f32,
    /// Seconds to return to 1
    pub fade_out: f32,
}

impl MultiplierRamp {
    /// Total length of the curve.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.fade_in + self.hold + self.fade_out
    }

    /// Multiplier `elapsed` seconds into the curve.
    #[must_use]
    pub fn value_at(&self, elapsed: f32) -> f32 {
        if elapsed < self.fade_in {
            return lerp(1.0, self.target, elapsed / self.fade_in);
        }
        let held = elapsed - self.fade_in;
        if held < self.hold {
            return self.target;
        }
        let fading = held - self.hold;
        if fading < self.fade_out {
            return lerp(self.target, 1.0, fading / self.fade_out);
        }
        1.0
    }
}

/// What collecting a powerup produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    /// Credits to award before the race multiplier
    pub credits: u32,
    /// Popup to show
    pub event: GameEvent,
}

#[derive(Debug, Clone)]
struct ActivePowerup {
    kind: PowerupKind,
    ramp: MultiplierRamp,
    elapsed: f32,
}

/// Runs at most one powerup at a time.
#[derive(Debug, Clone, Default)]
pub struct PowerupManager {
    active: Option<ActivePowerup>,
}

impl PowerupManager {
    /// Creates a manager with nothing active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The running powerup, if any.
    #[must_use]
    pub fn active(&self) -> Option<&PowerupKind> {
        self.active.as_ref().map(|a| &a.kind)
    }

    /// Activates `kind`, cancelling whatever was running.
    pub fn collect(&mut self, kind: PowerupKind, player: &mut Player) -> Activation {
        self.cancel_all(player);
        info!("Powerup collected: {}", kind.info_text());

        let (activation, ramp) = match &kind {
            PowerupKind::SpeedBoost(boost) => (
                Activation {
                    credits: boost.credits,
                    event: GameEvent::Countdown {
                        message: format!("{} +{}", boost.info_text, boost.credits),
                        duration: boost.duration,
                        fade: boost.fade_in,
                    },
                },
                Some(MultiplierRamp {
                    target: boost.boost,
                    fade_in: boost.fade_in,
                    hold: boost.duration,
                    fade_out: boost.fade_out,
                }),
            ),
            PowerupKind::SlowMotion(slow) => (
                Activation {
                    credits: slow.credits,
                    event: GameEvent::Countdown {
                        message: format!("{} +{}", slow.info_text, slow.credits),
                        duration: slow.duration,
                        fade: slow.fade,
                    },
                },
                Some(MultiplierRamp {
                    target: slow.factor,
                    fade_in: slow.fade,
                    hold: slow.duration,
                    fade_out: slow.fade,
                }),
            ),
            // completes on the spot
            PowerupKind::BonusCredits(bonus) => (
                Activation {
                    credits: bonus.amount,
                    event: GameEvent::info(format!("{} +{}", bonus.info_text, bonus.amount)),
                },
                None,
            ),
        };

        if let Some(ramp) = ramp {
            self.active = Some(ActivePowerup {
                kind,
                ramp,
                elapsed: 0.0,
            });
        }
        activation
    }

    /// Advances the running curve and applies it to `player`.
    ///
    /// Returns the powerup if it finished during this update.
    pub fn update(&mut self, dt: f32, player: &mut Player) -> Option<PowerupKind> {
        let active = self.active.as_mut()?;
        active.elapsed += dt;
        if active.elapsed >= active.ramp.duration() {
            player.set_speed_multiplier(1.0);
            return self.active.take().map(|a| a.kind);
        }
        player.set_speed_multiplier(active.ramp.value_at(active.elapsed));
        None
    }

    /// Stops the running powerup and restores the multiplier.
    pub fn cancel_all(&mut self, player: &mut Player) {
        if self.active.take().is_some() {
            player.set_speed_multiplier(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerConfig;
    use xracer_level::{BonusCredits, SlowMotion, SpeedBoost};

    #[test]
    fn test_ramp_shape() {
        let ramp = MultiplierRamp {
            target: 2.0,
            fade_in: 1.0,
            hold: 2.0,
            fade_out: 1.0,
        };
        assert_eq!(ramp.value_at(0.0), 1.0);
        assert!((ramp.value_at(0.5) - 1.5).abs() < 1e-5);
        assert_eq!(ramp.value_at(2.0), 2.0);
        assert!((ramp.value_at(3.5) - 1.5).abs() < 1e-5);
        assert_eq!(ramp.value_at(10.0), 1.0);
    }

    #[test]
    fn test_zero_fades_jump() {
        let ramp = MultiplierRamp {
            target: 0.5,
            fade_in: 0.0,
            hold: 1.0,
            fade_out: 0.0,
        };
        assert_eq!(ramp.value_at(0.0), 0.5);
        assert_eq!(ramp.value_at(1.0), 1.0);
    }

    #[test]
    fn test_speed_boost_timeline() {
        let mut player = Player::new(PlayerConfig::default());
        let mut manager = PowerupManager::new();
        let activation = manager.collect(PowerupKind::SpeedBoost(SpeedBoost::default()), &mut player);
        assert_eq!(activation.credits, 500);
        assert!(matches!(activation.event, GameEvent::Countdown { .. }));

        // 0.5 s fade in, 2 s hold, 1 s fade out
        assert!(manager.update(0.5, &mut player).is_none());
        assert!((player.speed_multiplier() - 1.3).abs() < 1e-5);
        assert!(manager.update(2.0, &mut player).is_none());
        assert!(manager.update(0.5, &mut player).is_none());
        assert!((player.speed_multiplier() - 1.15).abs() < 1e-4);
        let done = manager.update(0.5, &mut player);
        assert!(matches!(done, Some(PowerupKind::SpeedBoost(_))));
        assert_eq!(player.speed_multiplier(), 1.0);
        assert!(manager.active().is_none());
    }

    #[test]
    fn test_new_powerup_cancels_old() {
        let mut player = Player::new(PlayerConfig::default());
        let mut manager = PowerupManager::new();
        manager.collect(PowerupKind::SpeedBoost(SpeedBoost::default()), &mut player);
        manager.update(1.0, &mut player);
        assert!(player.speed_multiplier() > 1.0);

        manager.collect(PowerupKind::SlowMotion(SlowMotion::default()), &mut player);
        assert_eq!(player.speed_multiplier(), 1.0);
        assert!(matches!(manager.active(), Some(PowerupKind::SlowMotion(_))));
    }

    #[test]
    fn test_bonus_credits_is_instant() {
        let mut player = Player::new(PlayerConfig::default());
        let mut manager = PowerupManager::new();
        let activation = manager.collect(PowerupKind::BonusCredits(BonusCredits::default()), &mut player);
        assert_eq!(activation.credits, 500);
        assert_eq!(activation.event, GameEvent::info("Bonus Credits +500"));
        assert!(manager.active().is_none());
    }

    #[test]
    fn test_cancel_all_restores_multiplier() {
        let mut player = Player::new(PlayerConfig::default());
        let mut manager = PowerupManager::new();
        manager.collect(PowerupKind::SlowMotion(SlowMotion::default()), &mut player);
        manager.update(0.4, &mut player);
        assert!(player.speed_multiplier() < 1.0);
        manager.cancel_all(&mut player);
        assert_eq!(player.speed_multiplier(), 1.0);
        assert!(manager.active().is_none());
    }
}
