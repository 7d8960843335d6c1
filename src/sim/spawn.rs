//! Asteroid factory
//!
//! All randomness is drawn from the caller's RNG so a seeded session replays
//! identically.

use rand::Rng;

use super::difficulty::DifficultyProfile;
use super::rect::Rect;
use super::state::Asteroid;
use crate::consts::*;

/// Chance an asteroid drops straight down instead of at a slant
pub const STRAIGHT_DOWN_CHANCE: f64 = 0.25;
/// Slanted asteroids travel within this cone (degrees from +x, 90 = down)
pub const DESCENT_CONE: (f32, f32) = (30.0, 150.0);
/// Spin range in degrees per tick, either direction
pub const MAX_ROTATION_SPEED: f32 = 2.0;

/// Uniform sample in [lo, hi); returns `lo` for an empty range
#[inline]
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// Create a new asteroid just above the top edge
pub fn spawn_asteroid<R: Rng + ?Sized>(profile: &DifficultyProfile, id: u32, rng: &mut R) -> Asteroid {
    let size = uniform(rng, ASTEROID_MIN_SIZE, ASTEROID_MAX_SIZE);
    let x = uniform(rng, 0.0, GAME_WIDTH - size);
    let speed = uniform(rng, profile.min_asteroid_speed(), profile.max_asteroid_speed());
    let angle = if rng.random_bool(STRAIGHT_DOWN_CHANCE) {
        90.0
    } else {
        uniform(rng, DESCENT_CONE.0, DESCENT_CONE.1)
    };
    let rotation = uniform(rng, 0.0, 360.0);
    let rotation_speed = uniform(rng, -MAX_ROTATION_SPEED, MAX_ROTATION_SPEED);

    Asteroid {
        id,
        rect: Rect::new(x, -size, size, size),
        speed,
        angle,
        rotation,
        rotation_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Difficulty;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawned_asteroids_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for difficulty in Difficulty::ALL {
            let profile = difficulty.profile();
            for id in 0..500 {
                let a = spawn_asteroid(&profile, id, &mut rng);
                let size = a.rect.width();
                assert_eq!(a.rect.width(), a.rect.height());
                assert!((ASTEROID_MIN_SIZE..=ASTEROID_MAX_SIZE).contains(&size));
                assert!(a.rect.pos.x >= 0.0 && a.rect.right() <= GAME_WIDTH + 1e-3);
                assert_eq!(a.rect.pos.y, -size);
                assert!(a.speed >= profile.min_asteroid_speed());
                assert!(a.speed <= profile.max_asteroid_speed());
                assert!((DESCENT_CONE.0..=DESCENT_CONE.1).contains(&a.angle));
                assert!((0.0..=360.0).contains(&a.rotation));
                assert!(a.rotation_speed.abs() <= MAX_ROTATION_SPEED);
                assert_eq!(a.id, id);
            }
        }
    }

    #[test]
    fn test_straight_down_share() {
        let mut rng = Pcg32::seed_from_u64(42);
        let profile = Difficulty::Medium.profile();
        let n = 4000;
        let straight = (0..n)
            .filter(|&id| spawn_asteroid(&profile, id, &mut rng).angle == 90.0)
            .count();
        let share = straight as f64 / n as f64;
        // 25% forced, plus a vanishing chance of sampling exactly 90 from the cone
        assert!((0.21..0.29).contains(&share), "straight-down share {share}");
    }

    #[test]
    fn test_same_seed_same_asteroid() {
        let profile = Difficulty::Hard.profile();
        let a = spawn_asteroid(&profile, 1, &mut Pcg32::seed_from_u64(99));
        let b = spawn_asteroid(&profile, 1, &mut Pcg32::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_speed_profile() {
        let profile = DifficultyProfile::new(2.5, 2.5, 10, 5).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..50 {
            assert_eq!(spawn_asteroid(&profile, id, &mut rng).speed, 2.5);
        }
    }
}
