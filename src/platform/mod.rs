//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Keyboard input
//! - Wall-clock timestamps and seeds

pub mod input;

pub use input::{InputTracker, Key};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a new round
pub fn fresh_seed() -> u64 {
    now_ms() as u64
}
