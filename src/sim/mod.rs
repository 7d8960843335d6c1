//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per call, no wall-clock time
//! - Randomness only from the caller's RNG
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod difficulty;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use difficulty::{Difficulty, DifficultyProfile, ProfileError};
pub use rect::{Rect, overlaps};
pub use spawn::spawn_asteroid;
pub use state::{Asteroid, Explosion, GameEvent, GamePhase, Laser, SessionState, Ship};
pub use tick::{TickInput, TickReport, tick, volley_offsets};
