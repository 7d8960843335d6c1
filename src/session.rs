//! Round driver
//!
//! A `GameSession` owns one round: its state, RNG and difficulty. The host
//! calls `frame` once per presented display frame; each call runs exactly one
//! simulation tick, so simulation speed follows the refresh rate. When the
//! ship is destroyed the game-over callback fires once and ticking stops.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::AudioSink;
use crate::sim::{
    Difficulty, DifficultyProfile, GameEvent, SessionState, TickInput, spawn_asteroid, tick,
};

/// Receives the final score when a round ends
pub type GameOverCallback = Box<dyn FnOnce(i64)>;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Ship destroyed; holds the reported final score
    Finished { final_score: i64 },
    /// Torn down before the round ended
    Cancelled,
}

/// Result of one `frame` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule another frame
    Continue,
    /// This frame ended the round
    GameOver { final_score: i64 },
    /// Nothing ran; the session had already finished or was cancelled
    Stopped,
}

/// One round of play
pub struct GameSession {
    difficulty: Difficulty,
    profile: DifficultyProfile,
    /// Persisted best at round start
    high_score: u64,
    state: SessionState,
    rng: Pcg32,
    status: SessionStatus,
    on_game_over: Option<GameOverCallback>,
}

impl GameSession {
    /// Start a round on a preset difficulty
    ///
    /// `high_score` is read once here and used for the volley upgrade
    /// threshold on every tick of the round.
    pub fn start(
        difficulty: Difficulty,
        high_score: u64,
        seed: u64,
        on_game_over: impl FnOnce(i64) + 'static,
    ) -> Self {
        Self::with_profile(difficulty, difficulty.profile(), high_score, seed, on_game_over)
    }

    /// Start a round with explicit tuning
    ///
    /// Profiles only come from `DifficultyProfile::new` or the preset table,
    /// so malformed tuning is rejected before a round can exist.
    pub fn with_profile(
        difficulty: Difficulty,
        profile: DifficultyProfile,
        high_score: u64,
        seed: u64,
        on_game_over: impl FnOnce(i64) + 'static,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = SessionState::new();

        // Rounds open with one asteroid already falling
        let id = state.next_entity_id();
        state.asteroids.push(spawn_asteroid(&profile, id, &mut rng));

        log::info!(
            "Round started on {} (seed {}, high score {})",
            difficulty.as_str(),
            seed,
            high_score
        );

        Self::from_state(difficulty, profile, high_score, state, rng, on_game_over)
    }

    /// Resume from an existing state (scripted scenarios, tests)
    pub fn from_state(
        difficulty: Difficulty,
        profile: DifficultyProfile,
        high_score: u64,
        state: SessionState,
        rng: Pcg32,
        on_game_over: impl FnOnce(i64) + 'static,
    ) -> Self {
        Self {
            difficulty,
            profile,
            high_score,
            state,
            rng,
            status: SessionStatus::Running,
            on_game_over: Some(Box::new(on_game_over)),
        }
    }

    /// Run one simulation tick for this display frame
    pub fn frame(&mut self, input: &TickInput, audio: &mut dyn AudioSink) -> FrameStatus {
        if self.status != SessionStatus::Running {
            return FrameStatus::Stopped;
        }

        let report = tick(
            &mut self.state,
            input,
            &self.profile,
            self.high_score,
            &mut self.rng,
        );

        for event in &report.events {
            match event {
                GameEvent::ShotFired { shots } => {
                    log::debug!("Volley of {} at tick {}", shots, self.state.time_ticks);
                    audio.play_shot_sound();
                }
                GameEvent::AsteroidDestroyed { .. } => audio.play_explosion_sound(),
                GameEvent::ShipDestroyed => audio.play_game_over_sound(),
            }
        }

        match report.final_score {
            Some(final_score) => {
                self.finish(final_score);
                FrameStatus::GameOver { final_score }
            }
            None => FrameStatus::Continue,
        }
    }

    fn finish(&mut self, final_score: i64) {
        self.status = SessionStatus::Finished { final_score };
        log::info!(
            "Round over on {} after {} ticks: score {}",
            self.difficulty.as_str(),
            self.state.time_ticks,
            final_score
        );
        if let Some(callback) = self.on_game_over.take() {
            callback(final_score);
        }
    }

    /// Stop the round without reporting a score. No tick runs afterwards.
    pub fn cancel(&mut self) {
        if self.status == SessionStatus::Running {
            log::info!("Round cancelled at tick {}", self.state.time_ticks);
            self.status = SessionStatus::Cancelled;
            self.on_game_over = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Current state for drawing
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }
}
