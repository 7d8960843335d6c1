//! Screen flow around rounds
//!
//! `App` walks the player from the title screen through difficulty selection
//! into a round and on to the game-over screen. It owns the collaborators a
//! round needs (storage, audio, keyboard state) and does the bookkeeping once a
//! round ends: high score, badges, confetti and observers.

use std::cell::Cell;
use std::rc::Rc;

use crate::audio::AudioSink;
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};
use crate::highscores::{HighScores, ScoreStore};
use crate::persistence::KeyValueStore;
use crate::platform::{self, InputTracker};
use crate::rewards::{BadgeTracker, Celebration, SessionObserver, SessionOutcome};
use crate::session::{FrameStatus, GameOverCallback, GameSession};
use crate::settings::Settings;
use crate::sim::Difficulty;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    SelectDifficulty,
    Playing,
    GameOver { final_score: i64, new_high_score: bool },
}

/// Top-level game application
pub struct App {
    screen: Screen,
    settings: Settings,
    high_scores: HighScores,
    store: Box<dyn KeyValueStore>,
    audio: Box<dyn AudioSink>,
    /// Audio is only initialized after the first user gesture
    audio_ready: bool,
    input: InputTracker,
    difficulty: Difficulty,
    session: Option<GameSession>,
    /// Filled by the running session's game-over callback
    finished: Rc<Cell<Option<i64>>>,
    paused: bool,
    /// Leaderboard place of the last finished round
    last_rank: Option<usize>,
    badges: BadgeTracker,
    celebration: Option<Celebration>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl App {
    pub fn new(mut store: Box<dyn KeyValueStore>, audio: Box<dyn AudioSink>) -> Self {
        HighScores::migrate_legacy(store.as_mut());
        let settings = Settings::load(store.as_ref());
        let high_scores = HighScores::load(store.as_ref());
        let badges = BadgeTracker::new(high_scores.high_score());

        Self {
            screen: Screen::Welcome,
            difficulty: settings.difficulty,
            settings,
            high_scores,
            store,
            audio,
            audio_ready: false,
            input: InputTracker::new(),
            session: None,
            finished: Rc::new(Cell::new(None)),
            paused: false,
            last_rank: None,
            badges,
            celebration: None,
            observers: Vec::new(),
        }
    }

    /// Leave the title screen. The first call also wakes up audio.
    pub fn start(&mut self) -> bool {
        if self.screen != Screen::Welcome {
            return false;
        }
        if !self.audio_ready {
            self.audio.init();
            self.audio.set_muted(self.settings.muted);
            self.audio_ready = true;
        }
        self.screen = Screen::SelectDifficulty;
        true
    }

    /// Pick a difficulty and start a round on it
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.screen != Screen::SelectDifficulty {
            return false;
        }
        if self.settings.difficulty != difficulty {
            self.settings.difficulty = difficulty;
            self.settings.save(self.store.as_mut());
        }
        self.begin_round(difficulty);
        true
    }

    /// New round on the same difficulty
    pub fn play_again(&mut self) -> bool {
        if !matches!(self.screen, Screen::GameOver { .. }) {
            return false;
        }
        self.begin_round(self.difficulty);
        true
    }

    /// Back to difficulty select after a round
    pub fn main_menu(&mut self) -> bool {
        if !matches!(self.screen, Screen::GameOver { .. }) {
            return false;
        }
        self.session = None;
        self.screen = Screen::SelectDifficulty;
        self.sync_music();
        true
    }

    /// Abandon the running round; no score is recorded
    pub fn exit_round(&mut self) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        if let Some(session) = &mut self.session {
            session.cancel();
        }
        self.session = None;
        self.finished.set(None);
        self.paused = false;
        self.input.release_all();
        self.screen = Screen::SelectDifficulty;
        self.sync_music();
        true
    }

    pub fn toggle_mute(&mut self) {
        self.settings.muted = !self.settings.muted;
        self.audio.set_muted(self.settings.muted);
        log::info!("Muted: {}", self.settings.muted);
        self.settings.save(self.store.as_mut());
        self.sync_music();
    }

    /// Window lost focus: drop held keys and hold the round if configured
    pub fn blur(&mut self) {
        self.input.release_all();
        if self.settings.pause_on_blur && self.screen == Screen::Playing && !self.paused {
            log::info!("Round paused (window blur)");
            self.paused = true;
        }
    }

    /// Window regained focus
    pub fn focus(&mut self) {
        if self.paused {
            log::info!("Round resumed");
            self.paused = false;
        }
    }

    /// Forward a DOM key event; returns true when the key is a game control
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        self.input.handle_key(key, pressed)
    }

    /// Advance one display frame
    pub fn frame(&mut self) -> FrameStatus {
        self.badges.update();
        if let Some(celebration) = &mut self.celebration {
            celebration.update();
            if !celebration.is_active() {
                self.celebration = None;
            }
        }

        if self.screen != Screen::Playing || self.paused {
            return FrameStatus::Stopped;
        }
        let Some(session) = &mut self.session else {
            return FrameStatus::Stopped;
        };

        let input = self.input.tick_input();
        let status = session.frame(&input, self.audio.as_mut());
        if let Some(final_score) = self.finished.take() {
            self.finish_round(final_score);
        }
        status
    }

    /// Release audio (page unload)
    pub fn shutdown(&mut self) {
        if let Some(session) = &mut self.session {
            session.cancel();
        }
        self.audio.dispose();
        self.audio_ready = false;
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn high_score(&self) -> u64 {
        self.high_scores.high_score()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Leaderboard place of the last finished round, if it placed
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current or just-finished round, for drawing
    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn badges(&self) -> &BadgeTracker {
        &self.badges
    }

    pub fn celebration(&self) -> Option<&Celebration> {
        self.celebration.as_ref()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn begin_round(&mut self, difficulty: Difficulty) {
        let session = GameSession::start(
            difficulty,
            self.high_scores.high_score(),
            platform::fresh_seed(),
            self.round_callback(),
        );
        self.launch(session);
    }

    fn round_callback(&self) -> GameOverCallback {
        let finished = self.finished.clone();
        Box::new(move |final_score| finished.set(Some(final_score)))
    }

    fn launch(&mut self, session: GameSession) {
        self.difficulty = session.difficulty();
        self.session = Some(session);
        self.finished.set(None);
        self.paused = false;
        self.last_rank = None;
        self.input.release_all();
        self.screen = Screen::Playing;
        self.sync_music();
    }

    fn finish_round(&mut self, final_score: i64) {
        let previous_high_score = self.high_scores.high_score();
        let outcome = SessionOutcome {
            final_score,
            difficulty: self.difficulty,
            previous_high_score,
            new_high_score: u64::try_from(final_score).is_ok_and(|s| s > previous_high_score),
        };

        self.last_rank = self
            .high_scores
            .set_high_score(outcome.recorded_score(), self.difficulty);
        if let Some(rank) = self.last_rank {
            log::info!("Score {} placed #{} on the leaderboard", outcome.recorded_score(), rank);
            self.high_scores.save(self.store.as_mut());
        }

        if outcome.new_high_score {
            log::info!(
                "New high score: {} (was {})",
                outcome.recorded_score(),
                previous_high_score
            );
            if self.settings.confetti {
                self.celebration = Some(Celebration::new(
                    platform::fresh_seed(),
                    GAME_WIDTH,
                    GAME_HEIGHT,
                ));
            }
        }

        self.badges.on_session_over(&outcome);
        for observer in &mut self.observers {
            observer.on_session_over(&outcome);
        }

        self.screen = Screen::GameOver {
            final_score,
            new_high_score: outcome.new_high_score,
        };
        self.sync_music();
    }

    /// Music plays only during a round and only when unmuted
    fn sync_music(&mut self) {
        if !self.audio_ready {
            return;
        }
        if self.screen == Screen::Playing && !self.settings.muted {
            self.audio.start_music();
        } else {
            self.audio.stop_music();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::rewards::Badge;
    use crate::sim::SessionState;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Audio that records calls into a shared log
    struct SharedAudio(Log);

    impl AudioSink for SharedAudio {
        fn init(&mut self) {
            self.0.borrow_mut().push("init");
        }
        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().push(if muted { "mute" } else { "unmute" });
        }
        fn play_shot_sound(&mut self) {
            self.0.borrow_mut().push("shot");
        }
        fn play_explosion_sound(&mut self) {
            self.0.borrow_mut().push("explosion");
        }
        fn play_game_over_sound(&mut self) {
            self.0.borrow_mut().push("game_over");
        }
        fn start_music(&mut self) {
            self.0.borrow_mut().push("music_on");
        }
        fn stop_music(&mut self) {
            self.0.borrow_mut().push("music_off");
        }
    }

    struct OutcomeLog(Rc<RefCell<Vec<SessionOutcome>>>);

    impl SessionObserver for OutcomeLog {
        fn on_session_over(&mut self, outcome: &SessionOutcome) {
            self.0.borrow_mut().push(*outcome);
        }
    }

    fn app_with(store: MemoryStore) -> (App, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let app = App::new(Box::new(store), Box::new(SharedAudio(log.clone())));
        (app, log)
    }

    /// Put the app into a round that ends on its first frame with `score`
    fn launch_doomed_round(app: &mut App, score: i64) {
        let mut state = SessionState::new();
        state.score = score;
        let ship = state.ship.rect;
        state.push_asteroid(ship, 0.0, 90.0);
        let session = GameSession::from_state(
            app.difficulty,
            app.difficulty.profile(),
            app.high_score(),
            state,
            Pcg32::seed_from_u64(4),
            app.round_callback(),
        );
        app.launch(session);
    }

    #[test]
    fn test_screen_flow() {
        let (mut app, log) = app_with(MemoryStore::new());
        assert_eq!(app.screen(), Screen::Welcome);
        assert!(!app.play_again());

        assert!(app.start());
        assert_eq!(app.screen(), Screen::SelectDifficulty);
        assert_eq!(log.borrow().first(), Some(&"init"));

        assert!(app.select_difficulty(Difficulty::Hard));
        assert_eq!(app.screen(), Screen::Playing);
        assert_eq!(app.difficulty(), Difficulty::Hard);
        assert_eq!(app.session().map(|s| s.state().asteroids.len()), Some(1));
        assert_eq!(log.borrow().last(), Some(&"music_on"));

        assert!(app.exit_round());
        assert_eq!(app.screen(), Screen::SelectDifficulty);
        assert!(app.session().is_none());
        assert_eq!(log.borrow().last(), Some(&"music_off"));
    }

    #[test]
    fn test_audio_initialized_once() {
        let (mut app, log) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Easy);
        app.exit_round();
        assert!(!app.start());
        let inits = log.borrow().iter().filter(|c| **c == "init").count();
        assert_eq!(inits, 1);
    }

    #[test]
    fn test_game_over_records_high_score() {
        let (mut app, log) = app_with(MemoryStore::new());
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        app.add_observer(Box::new(OutcomeLog(outcomes.clone())));
        app.start();
        app.select_difficulty(Difficulty::Medium);
        launch_doomed_round(&mut app, 2600);

        assert_eq!(app.frame(), FrameStatus::GameOver { final_score: 2600 });
        assert_eq!(
            app.screen(),
            Screen::GameOver {
                final_score: 2600,
                new_high_score: true
            }
        );
        assert_eq!(app.high_score(), 2600);
        assert_eq!(HighScores::load(app.store()).high_score(), 2600);
        assert!(app.celebration().is_some());
        assert_eq!(app.badges().popup(), Some(Badge::Rookie));
        assert_eq!(log.borrow().last(), Some(&"music_off"));

        let outcomes = outcomes.borrow();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].difficulty, Difficulty::Medium);
        assert_eq!(outcomes[0].previous_high_score, 0);
        assert!(outcomes[0].new_high_score);
    }

    #[test]
    fn test_lower_score_leaves_high_score() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score(5000, Difficulty::Easy, 0.0);
        scores.save(&mut store);

        let (mut app, _) = app_with(store);
        app.start();
        app.select_difficulty(Difficulty::Easy);
        launch_doomed_round(&mut app, 1200);
        app.frame();

        assert_eq!(
            app.screen(),
            Screen::GameOver {
                final_score: 1200,
                new_high_score: false
            }
        );
        assert_eq!(app.high_score(), 5000);
        assert!(app.celebration().is_none());
        // Still placed on the leaderboard, below the record
        assert_eq!(app.last_rank(), Some(2));
        let saved: Vec<u64> = HighScores::load(app.store())
            .entries
            .iter()
            .map(|e| e.score)
            .collect();
        assert_eq!(saved, vec![5000, 1200]);
    }

    #[test]
    fn test_legacy_high_score_migrated_on_startup() {
        let mut store = MemoryStore::new();
        store.set("asteroidBlasterHighScore", "2700").unwrap();
        let (app, _) = app_with(store);

        assert_eq!(app.high_score(), 2700);
        assert_eq!(app.badges().current(), Some(Badge::Rookie));
        assert_eq!(app.store().get("asteroidBlasterHighScore"), None);
    }

    #[test]
    fn test_negative_score_is_not_recorded() {
        let (mut app, _) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Easy);
        launch_doomed_round(&mut app, -30);
        app.frame();

        assert_eq!(
            app.screen(),
            Screen::GameOver {
                final_score: -30,
                new_high_score: false
            }
        );
        assert!(app.high_scores().is_empty());
        assert_eq!(app.last_rank(), None);
    }

    #[test]
    fn test_confetti_respects_setting() {
        let mut store = MemoryStore::new();
        Settings {
            confetti: false,
            ..Default::default()
        }
        .save(&mut store);

        let (mut app, _) = app_with(store);
        app.start();
        app.select_difficulty(Difficulty::Easy);
        launch_doomed_round(&mut app, 900);
        app.frame();
        assert_eq!(app.high_score(), 900);
        assert!(app.celebration().is_none());
    }

    #[test]
    fn test_play_again_and_main_menu() {
        let (mut app, _) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Extreme);
        launch_doomed_round(&mut app, 10);
        app.frame();

        assert!(app.play_again());
        assert_eq!(app.screen(), Screen::Playing);
        assert_eq!(app.difficulty(), Difficulty::Extreme);

        launch_doomed_round(&mut app, 10);
        app.frame();
        assert!(app.main_menu());
        assert_eq!(app.screen(), Screen::SelectDifficulty);
        assert!(app.session().is_none());
    }

    #[test]
    fn test_selected_difficulty_is_remembered() {
        let (mut app, _) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Hard);
        assert_eq!(Settings::load(app.store()).difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_mute_stops_music_and_persists() {
        let (mut app, log) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Easy);
        app.toggle_mute();

        assert!(app.settings().muted);
        assert_eq!(*log.borrow().last().unwrap(), "music_off");
        assert!(log.borrow().contains(&"mute"));
        assert!(Settings::load(app.store()).muted);

        app.toggle_mute();
        assert_eq!(*log.borrow().last().unwrap(), "music_on");
    }

    #[test]
    fn test_no_music_outside_rounds() {
        let (mut app, log) = app_with(MemoryStore::new());
        app.toggle_mute();
        app.toggle_mute();
        // Audio was never initialized, so nothing may start
        assert!(!log.borrow().contains(&"music_on"));
    }

    #[test]
    fn test_blur_pauses_round() {
        let (mut app, _) = app_with(MemoryStore::new());
        app.start();
        app.select_difficulty(Difficulty::Easy);
        app.handle_key("ArrowLeft", true);
        app.frame();
        let ticks = app.session().map(|s| s.state().time_ticks);

        app.blur();
        assert!(app.is_paused());
        assert_eq!(app.frame(), FrameStatus::Stopped);
        assert_eq!(app.session().map(|s| s.state().time_ticks), ticks);

        app.focus();
        app.frame();
        assert_eq!(
            app.session().map(|s| s.state().time_ticks),
            ticks.map(|t| t + 1)
        );
        // Held keys were dropped on blur
        assert_eq!(
            app.session().map(|s| s.state().ship.rect.pos.x),
            Some(380.0 - 7.0)
        );
    }

    #[test]
    fn test_exit_round_reports_nothing() {
        let (mut app, _) = app_with(MemoryStore::new());
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        app.add_observer(Box::new(OutcomeLog(outcomes.clone())));
        app.start();
        app.select_difficulty(Difficulty::Easy);
        launch_doomed_round(&mut app, 4000);
        app.exit_round();

        assert_eq!(app.frame(), FrameStatus::Stopped);
        assert!(outcomes.borrow().is_empty());
        assert!(app.high_scores().is_empty());
    }
}
