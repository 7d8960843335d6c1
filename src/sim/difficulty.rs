//! Difficulty presets
//!
//! The preset table below is the only place profile values live. Everything
//! else looks them up through `Difficulty::profile`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named difficulty levels, in increasing order of difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "extreme" => Some(Difficulty::Extreme),
            _ => None,
        }
    }

    /// Tuning values for this level
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            // Medium carries the values that used to ship as "extreme"
            Difficulty::Easy => DifficultyProfile {
                min_asteroid_speed: 1.0,
                max_asteroid_speed: 3.0,
                spawn_interval_ticks: 45,
                laser_cooldown_ticks: 15,
            },
            Difficulty::Medium => DifficultyProfile {
                min_asteroid_speed: 4.0,
                max_asteroid_speed: 7.0,
                spawn_interval_ticks: 18,
                laser_cooldown_ticks: 8,
            },
            Difficulty::Hard => DifficultyProfile {
                min_asteroid_speed: 5.0,
                max_asteroid_speed: 8.5,
                spawn_interval_ticks: 15,
                laser_cooldown_ticks: 7,
            },
            Difficulty::Extreme => DifficultyProfile {
                min_asteroid_speed: 6.5,
                max_asteroid_speed: 10.0,
                spawn_interval_ticks: 12,
                laser_cooldown_ticks: 6,
            },
        }
    }
}

/// Rejected profile values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("asteroid speed {0} must be finite and positive")]
    InvalidSpeed(f32),
    #[error("min asteroid speed {min} exceeds max {max}")]
    SpeedRangeInverted { min: f32, max: f32 },
    #[error("spawn interval must be at least one tick")]
    ZeroSpawnInterval,
    #[error("laser cooldown must be at least one tick")]
    ZeroLaserCooldown,
}

/// Immutable tuning for one round
///
/// Only built by `new` (validated) or from the preset table, so every
/// profile a round sees is runnable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyProfile {
    /// Asteroid speed range (pixels per tick)
    min_asteroid_speed: f32,
    max_asteroid_speed: f32,
    /// A new asteroid spawns on every tick divisible by this
    spawn_interval_ticks: u32,
    /// Ticks between volleys while fire is held
    laser_cooldown_ticks: u32,
}

impl DifficultyProfile {
    /// Build a custom profile, rejecting values the simulation can't run with
    pub fn new(
        min_asteroid_speed: f32,
        max_asteroid_speed: f32,
        spawn_interval_ticks: u32,
        laser_cooldown_ticks: u32,
    ) -> Result<Self, ProfileError> {
        let profile = Self {
            min_asteroid_speed,
            max_asteroid_speed,
            spawn_interval_ticks,
            laser_cooldown_ticks,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn min_asteroid_speed(&self) -> f32 {
        self.min_asteroid_speed
    }

    pub fn max_asteroid_speed(&self) -> f32 {
        self.max_asteroid_speed
    }

    pub fn spawn_interval_ticks(&self) -> u32 {
        self.spawn_interval_ticks
    }

    pub fn laser_cooldown_ticks(&self) -> u32 {
        self.laser_cooldown_ticks
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        for speed in [self.min_asteroid_speed, self.max_asteroid_speed] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ProfileError::InvalidSpeed(speed));
            }
        }
        if self.min_asteroid_speed > self.max_asteroid_speed {
            return Err(ProfileError::SpeedRangeInverted {
                min: self.min_asteroid_speed,
                max: self.max_asteroid_speed,
            });
        }
        if self.spawn_interval_ticks == 0 {
            return Err(ProfileError::ZeroSpawnInterval);
        }
        if self.laser_cooldown_ticks == 0 {
            return Err(ProfileError::ZeroLaserCooldown);
        }
        Ok(())
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.profile()
    }
}
