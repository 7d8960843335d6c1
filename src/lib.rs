//! Asteroid Blaster - A keyboard-driven asteroid shooter
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (ship, lasers, asteroids, collisions)
//! - `session`: Drives one round of the simulation and reports the final score
//! - `app`: Screen flow, music and high-score bookkeeping around sessions
//! - `platform`: Browser/native platform abstraction (keyboard input)
//! - `persistence`: Key/value storage backends
//! - `rewards`: Badges and confetti, layered on top of session results

pub mod app;
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod rewards;
pub mod session;
pub mod settings;
pub mod sim;

pub use app::{App, Screen};
pub use highscores::{HighScores, ScoreStore};
pub use session::{FrameStatus, GameSession};
pub use settings::Settings;
pub use sim::{Difficulty, DifficultyProfile};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Ship defaults
    pub const SPACESHIP_WIDTH: f32 = 40.0;
    pub const SPACESHIP_HEIGHT: f32 = 50.0;
    /// Pixels per tick per held arrow key
    pub const SPACESHIP_SPEED: f32 = 7.0;
    /// Gap between the ship's starting position and the bottom edge
    pub const SPACESHIP_START_MARGIN: f32 = 20.0;

    /// Laser defaults
    pub const LASER_WIDTH: f32 = 5.0;
    pub const LASER_HEIGHT: f32 = 20.0;
    /// Pixels per tick, upward
    pub const LASER_SPEED: f32 = 10.0;

    /// Asteroid side length range
    pub const ASTEROID_MIN_SIZE: f32 = 30.0;
    pub const ASTEROID_MAX_SIZE: f32 = 80.0;

    /// Explosion lifetime in seconds at 60 Hz
    pub const EXPLOSION_DURATION: f32 = 0.5;
    /// Life lost per tick (1.0 → 0.0 over `EXPLOSION_DURATION`)
    pub const EXPLOSION_DECAY: f32 = 1.0 / (EXPLOSION_DURATION * FRAMES_PER_SECOND as f32);

    /// Score an asteroid is measured against: points = ceil(BASE - width)
    pub const ASTEROID_SCORE_BASE: f32 = 100.0;

    /// Nominal display refresh rate the tick constants are tuned for
    pub const FRAMES_PER_SECOND: u32 = 60;
}

/// Rotation in degrees wrapped to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}
