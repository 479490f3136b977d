//! Run lifecycle, scoring and timer dispatch
//!
//! A [`Session`] owns the one authoritative [`GameState`] and everything that
//! may touch it: the engine, the hazard scheduler, the timers and the score
//! store. Control signals and timer firings are plain method calls that run
//! to completion, so the state is never mutated from two places at once.
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --pause--> Running
//!                 Running --collision--> Terminated --start--> Running
//! ```

use super::{
    action::{Direction, Signal},
    config::{Difficulty, GameConfig},
    engine::{GameEngine, StepResult},
    hazard::HazardScheduler,
    scheduler::{Scheduler, TimerKind, TimerToken},
    state::{CollisionKind, GameState, Position, RunMode},
};
use crate::storage::{BEST_SCORE_KEY, ScoreStore};
use log::{debug, info, warn};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::time::Duration;

/// Something the presentation layer may want to tell the player about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    PointScored(u32),
    NewBestScore(u32),
    GamePaused,
    GameResumed,
    GameOver { kind: CollisionKind, score: u32 },
    HazardSpawned(Position),
    HazardExpired,
}

pub struct Session<S, R = ThreadRng> {
    engine: GameEngine<R>,
    state: GameState,
    hazards: HazardScheduler,
    timers: Scheduler,
    store: S,
    best_score: u32,
    /// Heading requested since the last tick, committed on the next one
    pending_direction: Option<Direction>,
    /// Session time; only moves forward
    clock: Duration,
    events: Vec<GameEvent>,
    /// Bumped on every change a renderer should see
    revision: u64,
}

impl<S: ScoreStore> Session<S, ThreadRng> {
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::with_engine(GameEngine::new(config), store)
    }
}

impl<S: ScoreStore, R: Rng> Session<S, R> {
    /// Build a session around an engine; reads the best score once
    pub fn with_engine(mut engine: GameEngine<R>, store: S) -> Self {
        let best_score = match store.get(BEST_SCORE_KEY) {
            Ok(best) => best.unwrap_or(0),
            Err(err) => {
                warn!("could not read best score, starting from 0: {err}");
                0
            }
        };

        let state = engine.reset();
        let hazards = HazardScheduler::from_config(engine.config());

        Self {
            engine,
            state,
            hazards,
            timers: Scheduler::new(),
            store,
            best_score,
            pending_direction: None,
            clock: Duration::ZERO,
            events: Vec::new(),
            revision: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> RunMode {
        self.state.mode
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.config().difficulty
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    /// Earliest moment a timer wants to fire
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Hand over everything that happened since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move the session clock to `now` and fire every timer due by then
    ///
    /// Each callback sees the clock at its own deadline, so anything it arms
    /// is timed from when it should have fired.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.clock {
            return;
        }
        while let Some(token) = self.timers.pop_due(now) {
            self.clock = self.clock.max(token.due);
            self.fire(token);
        }
        self.clock = now;
    }

    /// Run a timer callback; stale tokens are dropped
    pub fn fire(&mut self, token: TimerToken) {
        if !self.timers.is_current(token) {
            debug!("dropping stale {:?} timer", token.kind);
            return;
        }

        match token.kind {
            TimerKind::Movement => self.tick(),
            TimerKind::HazardSpawn => self.spawn_hazard(),
            TimerKind::HazardExpiry => self.expire_hazard(),
        }
    }

    pub fn handle(&mut self, signal: Signal) {
        match signal {
            Signal::Turn(direction) => self.turn(direction),
            Signal::TogglePause => self.toggle_pause(),
            Signal::Start => self.start(),
        }
    }

    /// Queue a heading for the next tick
    ///
    /// Ignored outside a running game and when it would reverse the
    /// committed heading. The latest accepted request wins.
    pub fn turn(&mut self, direction: Direction) {
        if self.state.mode != RunMode::Running {
            return;
        }
        if self.state.snake.direction.is_opposite(direction) {
            return;
        }
        self.pending_direction = Some(direction);
    }

    pub fn toggle_pause(&mut self) {
        match self.state.mode {
            RunMode::Running => {
                self.state.mode = RunMode::Paused;
                self.timers.suspend(TimerKind::Movement, self.clock);
                self.timers.suspend(TimerKind::HazardSpawn, self.clock);
                self.emit(GameEvent::GamePaused);
            }
            RunMode::Paused => {
                self.state.mode = RunMode::Running;
                self.timers.resume(TimerKind::Movement, self.clock);
                self.timers.resume(TimerKind::HazardSpawn, self.clock);
                self.emit(GameEvent::GameResumed);
            }
            RunMode::Idle | RunMode::Terminated => {}
        }
    }

    /// Begin a fresh run from idle or after a game over
    pub fn start(&mut self) {
        if !self.state.mode.can_start() {
            return;
        }

        // Invalidate every outstanding timer from the previous run
        self.timers.cancel_all();

        self.state = self.engine.reset();
        self.state.mode = RunMode::Running;
        self.pending_direction = None;

        let tick_period = self.engine.config().tick_period();
        self.timers
            .arm_periodic(TimerKind::Movement, self.clock, tick_period);
        self.hazards.start(&mut self.timers, self.clock);

        info!(
            "run started on {} ({} ms ticks), best score {}",
            self.difficulty().as_str(),
            tick_period.as_millis(),
            self.best_score
        );
        self.emit(GameEvent::RunStarted);
    }

    /// Pick the difficulty for the next run; only while no run is in progress
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if !self.state.mode.can_start() {
            return false;
        }
        self.engine.config_mut().difficulty = difficulty;
        self.revision += 1;
        true
    }

    fn tick(&mut self) {
        if self.state.mode != RunMode::Running {
            return;
        }

        let direction = self
            .pending_direction
            .take()
            .unwrap_or(self.state.snake.direction);

        match self.engine.step(&mut self.state, direction) {
            StepResult::Moved => self.revision += 1,
            StepResult::Ate { score } => {
                self.emit(GameEvent::PointScored(score));
                self.record_score(score);
            }
            StepResult::Collided { kind, .. } => self.terminate(kind),
            StepResult::Frozen => {}
        }

        debug_assert!(self.state.invariants_hold());
    }

    fn record_score(&mut self, score: u32) {
        if score <= self.best_score {
            return;
        }

        self.best_score = score;
        if let Err(err) = self.store.set(BEST_SCORE_KEY, score) {
            warn!("could not persist best score {score}: {err}");
        }
        info!("new best score {score}");
        self.emit(GameEvent::NewBestScore(score));
    }

    fn terminate(&mut self, kind: CollisionKind) {
        // Leave Running and stop the run's timers in one step
        self.state.mode = RunMode::Terminated;
        self.timers.cancel(TimerKind::Movement);
        self.timers.cancel(TimerKind::HazardSpawn);
        self.pending_direction = None;

        let score = self.state.score;
        info!("game over: snake {} with score {score}", kind.describe());
        self.emit(GameEvent::GameOver { kind, score });
    }

    fn spawn_hazard(&mut self) {
        if let Some(cell) =
            self.hazards
                .try_spawn(&mut self.engine, &mut self.state, &mut self.timers, self.clock)
        {
            self.emit(GameEvent::HazardSpawned(cell));
        }
    }

    fn expire_hazard(&mut self) {
        if self.hazards.expire(&mut self.state) {
            self.emit(GameEvent::HazardExpired);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
        self.revision += 1;
    }
}
