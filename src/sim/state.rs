//! Session state and entity types
//!
//! Entities are plain values. Nothing holds a reference to anything else;
//! relationships (who hit whom) are recomputed from positions every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Ship destroyed; the round is over
    GameOver,
}

/// Something the step did that collaborators may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A volley left the ship
    ShotFired { shots: usize },
    /// A laser destroyed an asteroid
    AsteroidDestroyed { id: u32, points: i64 },
    /// An asteroid hit the ship
    ShipDestroyed,
}

/// The player's ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub rect: Rect,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            rect: Rect::new(
                GAME_WIDTH / 2.0 - SPACESHIP_WIDTH / 2.0,
                GAME_HEIGHT - SPACESHIP_HEIGHT - SPACESHIP_START_MARGIN,
                SPACESHIP_WIDTH,
                SPACESHIP_HEIGHT,
            ),
        }
    }
}

impl Ship {
    /// Ship with its top-left corner at `(x, y)`
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, SPACESHIP_WIDTH, SPACESHIP_HEIGHT),
        }
    }

    /// Move by `delta` then clamp inside the playfield
    pub fn move_by(&mut self, delta: Vec2) {
        self.rect.pos += delta;
        self.rect.clamp_within(Vec2::new(GAME_WIDTH, GAME_HEIGHT));
    }
}

/// A laser bolt travelling up the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    pub rect: Rect,
}

impl Laser {
    /// Laser whose horizontal center is `center_x` and whose top is `top`
    pub fn centered(id: u32, center_x: f32, top: f32) -> Self {
        Self {
            id,
            rect: Rect::new(center_x - LASER_WIDTH / 2.0, top, LASER_WIDTH, LASER_HEIGHT),
        }
    }

    /// Fully above the top edge
    pub fn is_offscreen(&self) -> bool {
        self.rect.bottom() <= 0.0
    }
}

/// A falling asteroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub rect: Rect,
    /// Pixels per tick along `angle`
    pub speed: f32,
    /// Travel direction in degrees (90 = straight down)
    pub angle: f32,
    /// Visual rotation in degrees, [0, 360)
    pub rotation: f32,
    /// Degrees per tick
    pub rotation_speed: f32,
}

impl Asteroid {
    /// Per-tick displacement
    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.angle.to_radians()) * self.speed
    }

    /// Advance one tick along the travel angle and spin
    pub fn advance(&mut self) {
        self.rect.pos += self.velocity();
        self.rotation = crate::wrap_degrees(self.rotation + self.rotation_speed);
    }

    /// Points for shooting this asteroid: smaller is worth more
    pub fn points(&self) -> i64 {
        (ASTEROID_SCORE_BASE - self.rect.width()).ceil() as i64
    }

    /// Fully below the bottom edge
    pub fn is_below_playfield(&self) -> bool {
        self.rect.pos.y >= GAME_HEIGHT
    }
}

/// Cosmetic explosion flash
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// 1.0 when spawned, removed at 0.0
    pub life: f32,
}

impl Explosion {
    /// Age by one tick; returns false once burnt out
    pub fn age(&mut self) -> bool {
        self.life -= EXPLOSION_DECAY;
        self.life > 0.0
    }
}

/// Everything that changes during a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Running score (may dip below zero from oversized asteroids)
    pub score: i64,
    pub ship: Ship,
    /// Live lasers, in spawn order
    pub lasers: Vec<Laser>,
    /// Live asteroids, in spawn order
    pub asteroids: Vec<Asteroid>,
    /// Visual effects (not gameplay-affecting)
    pub explosions: Vec<Explosion>,
    /// Ticks simulated so far; the first tick is tick 1
    pub time_ticks: u64,
    /// Ticks until the next volley may fire
    pub fire_cooldown: u32,
    pub phase: GamePhase,
    /// Next entity ID
    next_id: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh round with the ship in its starting spot and an empty sky
    pub fn new() -> Self {
        Self {
            score: 0,
            ship: Ship::default(),
            lasers: Vec::new(),
            asteroids: Vec::new(),
            explosions: Vec::new(),
            time_ticks: 0,
            fire_cooldown: 0,
            phase: GamePhase::Playing,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID (unique for the whole session)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Spawn an explosion at `pos`
    pub fn spawn_explosion(&mut self, pos: Vec2, size: f32) {
        let id = self.next_entity_id();
        self.explosions.push(Explosion {
            id,
            pos,
            size,
            life: 1.0,
        });
    }

    /// Place an asteroid directly (scripted scenarios, tests)
    pub fn push_asteroid(&mut self, rect: Rect, speed: f32, angle: f32) -> u32 {
        let id = self.next_entity_id();
        self.asteroids.push(Asteroid {
            id,
            rect,
            speed,
            angle,
            rotation: 0.0,
            rotation_speed: 0.0,
        });
        id
    }

    /// Place a laser directly (scripted scenarios, tests)
    pub fn push_laser(&mut self, center_x: f32, top: f32) -> u32 {
        let id = self.next_entity_id();
        self.lasers.push(Laser::centered(id, center_x, top));
        id
    }
}
