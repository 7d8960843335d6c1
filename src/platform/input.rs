//! Keyboard state tracking
//!
//! Key-down/key-up events flip a flag per control key. The simulation reads
//! the flags once per tick; reading never clears them, so a held key acts on
//! every tick.

use crate::sim::TickInput;

/// Control keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// Fire
    Space,
}

impl Key {
    pub const COUNT: usize = 5;

    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            " " | "Spacebar" => Some(Key::Space),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Key::ArrowLeft => 0,
            Key::ArrowRight => 1,
            Key::ArrowUp => 2,
            Key::ArrowDown => 3,
            Key::Space => 4,
        }
    }
}

/// Live pressed/released state of the control keys
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    pressed: [bool; Key::COUNT],
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.pressed[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.pressed[key.index()] = false;
    }

    /// Apply a raw key event. Returns true if the key is a control key,
    /// so the caller can suppress the browser default (page scrolling).
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        match Key::from_dom_key(key) {
            Some(key) => {
                if pressed {
                    self.press(key);
                } else {
                    self.release(key);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }

    /// Drop every held key (window lost focus, key-ups will never arrive)
    pub fn release_all(&mut self) {
        self.pressed = [false; Key::COUNT];
    }

    /// Snapshot for the next simulation tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_pressed(Key::ArrowLeft),
            right: self.is_pressed(Key::ArrowRight),
            up: self.is_pressed(Key::ArrowUp),
            down: self.is_pressed(Key::ArrowDown),
            fire: self.is_pressed(Key::Space),
        }
    }
}
