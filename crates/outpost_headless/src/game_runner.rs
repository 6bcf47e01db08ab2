//! Full-game execution with a scripted defender.
//!
//! A game runs on a simulated clock: each cycle polls the session, lets the
//! strategy place an order if it is the player's turn, then advances game time
//! by a fixed step. The loop is bounded by a cycle limit so a misconfigured
//! scenario cannot spin forever.

use std::time::Duration;

use outpost_core::rng::{GameRng, RandomSource};
use outpost_core::session::{Phase, Session};
use outpost_core::setup::ScenarioConfig;
use tracing::{debug, warn};

use crate::metrics::GameMetrics;
use crate::strategies::DefenderStrategy;

/// Default game time per cycle.
pub const DEFAULT_SECONDS_PER_CYCLE: f64 = 0.5;

/// Default cycle limit.
pub const DEFAULT_MAX_CYCLES: u32 = 2_000;

/// Configuration for a single game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Random seed for determinism.
    pub seed: u64,
    /// Scenario to play.
    pub scenario: ScenarioConfig,
    /// Defender strategy.
    pub strategy: DefenderStrategy,
    /// Game time per cycle.
    pub seconds_per_cycle: f64,
    /// Cycle limit.
    pub max_cycles: u32,
    /// Game ID for tracking.
    pub game_id: String,
}

impl GameConfig {
    /// Config with default pacing.
    #[must_use]
    pub fn new(scenario: ScenarioConfig, strategy: DefenderStrategy, seed: u64) -> Self {
        Self {
            seed,
            scenario,
            strategy,
            seconds_per_cycle: DEFAULT_SECONDS_PER_CYCLE,
            max_cycles: DEFAULT_MAX_CYCLES,
            game_id: format!("game_{seed}"),
        }
    }
}

/// One game in progress with a scripted defender.
#[derive(Debug)]
pub struct GameRunner<R = GameRng> {
    session: Session<R>,
    strategy: DefenderStrategy,
    step: Duration,
    elapsed: Duration,
    cycles: u32,
    metrics: GameMetrics,
}

impl GameRunner {
    /// Build a game from its config.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut metrics = GameMetrics::new(
            config.game_id,
            config.scenario.name.clone(),
            config.strategy.name.clone(),
            config.seed,
        );
        let session = Session::generate(config.scenario, config.seed);
        metrics.record_start(&session);
        Self::with_session(session, config.strategy, config.seconds_per_cycle, metrics)
    }
}

impl<R: RandomSource> GameRunner<R> {
    /// Wrap an existing session.
    #[must_use]
    pub fn with_session(
        session: Session<R>,
        strategy: DefenderStrategy,
        seconds_per_cycle: f64,
        metrics: GameMetrics,
    ) -> Self {
        let seconds = if seconds_per_cycle.is_finite() && seconds_per_cycle > 0.0 {
            seconds_per_cycle
        } else {
            DEFAULT_SECONDS_PER_CYCLE
        };
        Self {
            session,
            strategy,
            step: Duration::from_secs_f64(seconds),
            elapsed: Duration::ZERO,
            cycles: 0,
            metrics,
        }
    }

    /// Run one cycle. Returns `false` once the game is over.
    pub fn step(&mut self) -> bool {
        for event in self.session.poll(self.elapsed) {
            self.metrics.record_event(&event);
        }
        if self.session.is_over() {
            return false;
        }

        if self.session.phase() == Phase::PlayerTurn {
            if let Some(order) = self.strategy.choose_order(&mut self.session) {
                match self
                    .session
                    .submit_reinforcements(order.outpost, order.troops, self.elapsed)
                {
                    Ok(outcome) => {
                        debug!(
                            outpost = %order.outpost,
                            troops = order.troops,
                            ?outcome,
                            "Strategy order"
                        );
                    }
                    Err(e) => warn!(error = %e, "Strategy order rejected"),
                }
            }
        }

        self.elapsed += self.step;
        self.cycles += 1;
        true
    }

    /// Play until game over or `max_cycles`, then return the metrics.
    pub fn run_to_end(mut self, max_cycles: u32) -> GameMetrics {
        while self.cycles < max_cycles && self.step() {}

        // Flush events queued by the last order.
        for event in self.session.poll(self.elapsed) {
            self.metrics.record_event(&event);
        }
        if !self.session.is_over() {
            warn!(
                game = %self.metrics.game_id,
                cycles = self.cycles,
                "Cycle limit reached before game over"
            );
        }

        self.metrics.finalize(&self.session, self.elapsed);
        self.metrics
    }

    /// The session being played.
    #[must_use]
    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    /// Game time so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Cycles run so far.
    #[must_use]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

/// Play one complete game.
pub fn run_game(config: GameConfig) -> GameMetrics {
    let max_cycles = config.max_cycles;
    let seed = config.seed;
    let metrics = GameRunner::new(config).run_to_end(max_cycles);
    debug!(
        seed,
        winner = ?metrics.winner,
        reason = ?metrics.reason,
        duration = metrics.duration_secs,
        "Game finished"
    );
    metrics
}
