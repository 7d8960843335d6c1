//! Badges and confetti
//!
//! Purely cosmetic. Rewards watch finished rounds through `SessionObserver`
//! and never feed back into the simulation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::FRAMES_PER_SECOND;
use crate::sim::Difficulty;

/// Summary of a finished round, handed to every observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Raw final score (may be negative)
    pub final_score: i64,
    pub difficulty: Difficulty,
    /// Best score before this round
    pub previous_high_score: u64,
    /// The round beat `previous_high_score`
    pub new_high_score: bool,
}

impl SessionOutcome {
    /// Score as recorded in the leaderboard
    pub fn recorded_score(&self) -> u64 {
        u64::try_from(self.final_score.max(0)).unwrap_or(0)
    }
}

/// Reacts to finished rounds
pub trait SessionObserver {
    fn on_session_over(&mut self, outcome: &SessionOutcome);
}

/// Unlockable title, ordered from first to last
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    Rookie,
    Shooter,
    GalaxyDestroyer,
    LordOfTheAsteroids,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::Rookie,
        Badge::Shooter,
        Badge::GalaxyDestroyer,
        Badge::LordOfTheAsteroids,
    ];

    /// High score needed to unlock
    pub fn threshold(self) -> u64 {
        match self {
            Badge::Rookie => 2500,
            Badge::Shooter => 5000,
            Badge::GalaxyDestroyer => 8500,
            Badge::LordOfTheAsteroids => 10000,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Badge::Rookie => "The Rookie",
            Badge::Shooter => "Mr Shooter",
            Badge::GalaxyDestroyer => "Galaxy Destroyer",
            Badge::LordOfTheAsteroids => "Lord of the Asteroids",
        }
    }

    /// Highest badge a high score has unlocked
    pub fn earned(score: u64) -> Option<Badge> {
        Self::ALL.into_iter().rev().find(|b| score >= b.threshold())
    }

    /// Next badge to chase and the score it needs, `None` once all are unlocked
    pub fn next_goal(score: u64) -> Option<(u64, Badge)> {
        Self::ALL
            .into_iter()
            .find(|b| score < b.threshold())
            .map(|b| (b.threshold(), b))
    }
}

/// Line shown under the title screen
pub fn goal_message(high_score: u64) -> String {
    match Badge::next_goal(high_score) {
        Some((threshold, badge)) => {
            format!(
                "Reach {} points to unlock: {}",
                group_thousands(threshold),
                badge.title()
            )
        }
        None => "All badges unlocked!".to_string(),
    }
}

/// 10000 -> "10,000"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// How long a badge popup stays up
const BADGE_POPUP_FRAMES: u32 = 3 * FRAMES_PER_SECOND;

/// Tracks the player's badge and announces new unlocks
#[derive(Debug, Clone, Default)]
pub struct BadgeTracker {
    current: Option<Badge>,
    popup: Option<(Badge, u32)>,
}

impl BadgeTracker {
    pub fn new(high_score: u64) -> Self {
        Self {
            current: Badge::earned(high_score),
            popup: None,
        }
    }

    /// Highest badge unlocked so far
    pub fn current(&self) -> Option<Badge> {
        self.current
    }

    /// Badge being announced, if any
    pub fn popup(&self) -> Option<Badge> {
        self.popup.map(|(badge, _)| badge)
    }

    /// Advance the popup timer by one frame
    pub fn update(&mut self) {
        if let Some((_, frames)) = &mut self.popup {
            *frames = frames.saturating_sub(1);
            if *frames == 0 {
                self.popup = None;
            }
        }
    }
}

impl SessionObserver for BadgeTracker {
    fn on_session_over(&mut self, outcome: &SessionOutcome) {
        if !outcome.new_high_score {
            return;
        }
        let earned = Badge::earned(outcome.recorded_score());
        if earned > self.current {
            if let Some(badge) = earned {
                log::info!("Badge unlocked: {}", badge.title());
                self.popup = Some((badge, BADGE_POPUP_FRAMES));
            }
            self.current = earned;
        }
    }
}

/// Number of confetti pieces per celebration
pub const CONFETTI_COUNT: usize = 80;
/// Frames a celebration lasts
pub const CONFETTI_FRAMES: u32 = 2 * FRAMES_PER_SECOND;

/// A single piece of confetti
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confetti {
    pub x: f32,
    pub y: f32,
    /// Stroke width
    pub radius: f32,
    /// Sway phase offset
    pub phase: f32,
    /// HSL hue in degrees
    pub hue: f32,
    pub tilt: f32,
    pub tilt_angle: f32,
    pub tilt_angle_increment: f32,
}

/// Confetti burst shown after a new high score
#[derive(Debug, Clone)]
pub struct Celebration {
    pub pieces: Vec<Confetti>,
    /// Shared sway angle
    angle: f32,
    frames_left: u32,
}

impl Celebration {
    /// Scatter confetti across the top 30% of a `width` x `height` area
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pieces = (0..CONFETTI_COUNT)
            .map(|_| Confetti {
                x: rng.random::<f32>() * width,
                y: rng.random::<f32>() * height * 0.3,
                radius: rng.random::<f32>() * 8.0 + 4.0,
                phase: rng.random::<f32>() * 80.0,
                hue: rng.random::<f32>() * 360.0,
                tilt: rng.random::<f32>() * 10.0,
                tilt_angle: 0.0,
                tilt_angle_increment: rng.random::<f32>() * 0.07 + 0.05,
            })
            .collect();

        Self {
            pieces,
            angle: 0.0,
            frames_left: CONFETTI_FRAMES,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }

    /// Advance one frame; clears itself once time is up
    pub fn update(&mut self) {
        if !self.is_active() {
            return;
        }
        self.frames_left -= 1;
        if self.frames_left == 0 {
            self.pieces.clear();
            return;
        }

        self.angle += 0.01;
        for piece in &mut self.pieces {
            piece.tilt_angle += piece.tilt_angle_increment;
            piece.y += ((self.angle + piece.phase).cos() + 3.0 + piece.radius / 2.0) / 2.0;
            piece.x += self.angle.sin();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(final_score: i64, previous_high_score: u64) -> SessionOutcome {
        SessionOutcome {
            final_score,
            difficulty: Difficulty::Medium,
            previous_high_score,
            new_high_score: final_score > 0 && final_score as u64 > previous_high_score,
        }
    }

    #[test]
    fn test_badge_thresholds() {
        assert_eq!(Badge::earned(0), None);
        assert_eq!(Badge::earned(2499), None);
        assert_eq!(Badge::earned(2500), Some(Badge::Rookie));
        assert_eq!(Badge::earned(8499), Some(Badge::Shooter));
        assert_eq!(Badge::earned(8500), Some(Badge::GalaxyDestroyer));
        assert_eq!(Badge::earned(50_000), Some(Badge::LordOfTheAsteroids));
    }

    #[test]
    fn test_next_goal() {
        assert_eq!(Badge::next_goal(0), Some((2500, Badge::Rookie)));
        assert_eq!(Badge::next_goal(2500), Some((5000, Badge::Shooter)));
        assert_eq!(Badge::next_goal(9999), Some((10000, Badge::LordOfTheAsteroids)));
        assert_eq!(Badge::next_goal(10000), None);
        assert_eq!(goal_message(6000), "Reach 8,500 points to unlock: Galaxy Destroyer");
        assert_eq!(
            goal_message(9000),
            "Reach 10,000 points to unlock: Lord of the Asteroids"
        );
        assert_eq!(goal_message(12000), "All badges unlocked!");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(2500), "2,500");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_tracker_announces_new_badge() {
        let mut tracker = BadgeTracker::new(1000);
        tracker.on_session_over(&outcome(5200, 1000));
        assert_eq!(tracker.current(), Some(Badge::Shooter));
        assert_eq!(tracker.popup(), Some(Badge::Shooter));

        for _ in 0..BADGE_POPUP_FRAMES {
            tracker.update();
        }
        assert_eq!(tracker.popup(), None);
    }

    #[test]
    fn test_tracker_ignores_repeat_badge() {
        let mut tracker = BadgeTracker::new(2600);
        tracker.on_session_over(&outcome(3000, 2600));
        assert_eq!(tracker.current(), Some(Badge::Rookie));
        assert_eq!(tracker.popup(), None);
    }

    #[test]
    fn test_tracker_ignores_losing_rounds() {
        let mut tracker = BadgeTracker::new(0);
        tracker.on_session_over(&outcome(-40, 0));
        assert_eq!(tracker.current(), None);
        assert_eq!(tracker.popup(), None);
    }

    #[test]
    fn test_recorded_score_clamps_negative() {
        assert_eq!(outcome(-40, 0).recorded_score(), 0);
        assert_eq!(outcome(700, 0).recorded_score(), 700);
    }

    #[test]
    fn test_confetti_spawn_ranges() {
        let celebration = Celebration::new(3, 800.0, 600.0);
        assert_eq!(celebration.pieces.len(), CONFETTI_COUNT);
        for piece in &celebration.pieces {
            assert!((0.0..800.0).contains(&piece.x));
            assert!((0.0..180.0).contains(&piece.y));
            assert!((4.0..=12.0).contains(&piece.radius));
            assert!((0.0..=80.0).contains(&piece.phase));
            assert!((0.0..=360.0).contains(&piece.hue));
            assert!((0.0..=10.0).contains(&piece.tilt));
            assert!((0.05..=0.12 + 1e-6).contains(&piece.tilt_angle_increment));
        }
    }

    #[test]
    fn test_confetti_falls_then_clears() {
        let mut celebration = Celebration::new(3, 800.0, 600.0);
        let start: Vec<f32> = celebration.pieces.iter().map(|p| p.y).collect();
        celebration.update();
        for (piece, y) in celebration.pieces.iter().zip(start) {
            // Fall speed is at least (-1 + 3 + 2) / 2
            assert!(piece.y >= y + 2.0 - 1e-4);
        }

        for _ in 1..CONFETTI_FRAMES {
            assert!(celebration.is_active());
            celebration.update();
        }
        assert!(!celebration.is_active());
        assert!(celebration.pieces.is_empty());
    }
}
