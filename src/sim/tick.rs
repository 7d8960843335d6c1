//! Frame-stepped simulation tick
//!
//! One call advances a round by exactly one display frame. The steps run in
//! a fixed order; collision tie-breaks depend on it.

use glam::Vec2;
use rand::Rng;

use super::difficulty::DifficultyProfile;
use super::rect::overlaps;
use super::spawn::spawn_asteroid;
use super::state::{GameEvent, GamePhase, Laser, SessionState};
use crate::consts::*;

/// Controls held during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire held
    pub fire: bool,
}

impl TickInput {
    /// Net movement for the held arrow keys; opposite keys cancel
    pub fn movement(&self) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.left {
            delta.x -= SPACESHIP_SPEED;
        }
        if self.right {
            delta.x += SPACESHIP_SPEED;
        }
        if self.up {
            delta.y -= SPACESHIP_SPEED;
        }
        if self.down {
            delta.y += SPACESHIP_SPEED;
        }
        delta
    }
}

/// What a tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Points earned this tick (may be zero or negative)
    pub score_gained: i64,
    /// Set on the tick the ship is destroyed
    pub terminal: bool,
    /// Score including this tick's gain, present only when terminal
    pub final_score: Option<i64>,
    pub events: Vec<GameEvent>,
}

/// Upgrade thresholds and the horizontal shot offsets they unlock
static VOLLEYS: [(i64, &[f32]); 4] = [
    (5000, &[-18.0, -6.0, 6.0, 18.0]),
    (3000, &[-12.0, 0.0, 12.0]),
    (2000, &[-10.0, 10.0]),
    (i64::MIN, &[0.0]),
];

/// Shot offsets from the ship's center for a given upgrade threshold
pub fn volley_offsets(threshold: i64) -> &'static [f32] {
    VOLLEYS
        .iter()
        .find(|(min, _)| threshold >= *min)
        .map(|(_, offsets)| *offsets)
        .unwrap_or(&[0.0])
}

/// Advance the round by one tick
///
/// `high_score` is the persisted best, read once per session. The volley
/// size is picked from `max(state.score, high_score)` on every tick.
pub fn tick<R: Rng + ?Sized>(
    state: &mut SessionState,
    input: &TickInput,
    profile: &DifficultyProfile,
    high_score: u64,
    rng: &mut R,
) -> TickReport {
    let mut report = TickReport::default();

    // Nothing moves after the ship is gone
    if state.phase == GamePhase::GameOver {
        return report;
    }

    state.time_ticks += 1;

    // 1. Cooldown
    if state.fire_cooldown > 0 {
        state.fire_cooldown -= 1;
    }

    // 2. Ship
    state.ship.move_by(input.movement());

    // 3. Asteroids
    for asteroid in &mut state.asteroids {
        asteroid.advance();
    }
    if state
        .time_ticks
        .is_multiple_of(u64::from(profile.spawn_interval_ticks()))
    {
        let id = state.next_entity_id();
        let asteroid = spawn_asteroid(profile, id, rng);
        log::debug!(
            "tick {}: spawned asteroid {} (size {:.1}, speed {:.2}, angle {:.1})",
            state.time_ticks,
            id,
            asteroid.rect.width(),
            asteroid.speed,
            asteroid.angle
        );
        state.asteroids.push(asteroid);
    }

    // 4. Lasers
    for laser in &mut state.lasers {
        laser.rect.pos.y -= LASER_SPEED;
    }
    if input.fire && state.fire_cooldown == 0 {
        let threshold = state.score.max(i64::try_from(high_score).unwrap_or(i64::MAX));
        let offsets = volley_offsets(threshold);
        let center_x = state.ship.rect.center_x();
        let top = state.ship.rect.pos.y;
        for offset in offsets {
            let id = state.next_entity_id();
            state.lasers.push(Laser::centered(id, center_x + offset, top));
        }
        state.fire_cooldown = profile.laser_cooldown_ticks();
        report.events.push(GameEvent::ShotFired {
            shots: offsets.len(),
        });
    }

    // 5. Laser vs asteroid: first unmatched overlapping laser wins
    let mut consumed = vec![false; state.lasers.len()];
    let mut destroyed = Vec::new();
    state.asteroids.retain(|asteroid| {
        let hit = state
            .lasers
            .iter()
            .enumerate()
            .find(|(i, laser)| !consumed[*i] && overlaps(&laser.rect, &asteroid.rect))
            .map(|(i, _)| i);
        match hit {
            Some(i) => {
                consumed[i] = true;
                destroyed.push(*asteroid);
                false
            }
            None => true,
        }
    });
    for asteroid in destroyed {
        let points = asteroid.points();
        report.score_gained += points;
        state.spawn_explosion(asteroid.rect.pos, asteroid.rect.width());
        report.events.push(GameEvent::AsteroidDestroyed {
            id: asteroid.id,
            points,
        });
    }

    // 6. Drop spent and offscreen lasers
    let mut consumed = consumed.into_iter();
    state
        .lasers
        .retain(|laser| !consumed.next().unwrap_or(false) && !laser.is_offscreen());

    // 7. Asteroid vs ship, then drop asteroids below the playfield
    let ship = state.ship.rect;
    let mut crashed = Vec::new();
    state.asteroids.retain(|asteroid| {
        if overlaps(&ship, &asteroid.rect) {
            crashed.push(asteroid.rect);
            false
        } else {
            !asteroid.is_below_playfield()
        }
    });
    if !crashed.is_empty() {
        state.spawn_explosion(ship.pos, ship.width() * 2.0);
        for rect in &crashed {
            state.spawn_explosion(rect.pos, rect.width());
        }
        report.terminal = true;
        report.events.push(GameEvent::ShipDestroyed);
    }

    // 8. Explosions
    state.explosions.retain_mut(|explosion| explosion.age());

    // 9. Commit
    state.score += report.score_gained;
    if report.terminal {
        state.phase = GamePhase::GameOver;
        report.final_score = Some(state.score);
    }

    report
}
