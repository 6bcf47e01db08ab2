//! Batch game runner for balance testing.
//!
//! Runs many games in parallel using rayon. Game `i` of a batch always uses
//! seed `seed_start + i`, so a batch is reproducible regardless of how the
//! thread pool schedules it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use outpost_core::setup::ScenarioConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::game_runner::{run_game, GameConfig, DEFAULT_MAX_CYCLES, DEFAULT_SECONDS_PER_CYCLE};
use crate::metrics::{BatchSummary, GameMetrics};
use crate::strategies::DefenderStrategy;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to play
    pub scenario: ScenarioConfig,
    /// Defender strategy
    pub strategy: DefenderStrategy,
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Game time per cycle
    pub seconds_per_cycle: f64,
    /// Cycle limit per game
    pub max_cycles: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioConfig::default(),
            strategy: DefenderStrategy::default(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            seconds_per_cycle: DEFAULT_SECONDS_PER_CYCLE,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl BatchConfig {
    /// Create config for a number of games with a strategy
    pub fn new(strategy: DefenderStrategy, game_count: u32) -> Self {
        Self {
            strategy,
            game_count,
            ..Default::default()
        }
    }

    /// Set scenario
    pub fn with_scenario(mut self, scenario: ScenarioConfig) -> Self {
        self.scenario = scenario;
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    fn game_config(&self, seed: u64) -> GameConfig {
        GameConfig {
            seconds_per_cycle: self.seconds_per_cycle,
            max_cycles: self.max_cycles,
            ..GameConfig::new(self.scenario.clone(), self.strategy.clone(), seed)
        }
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics, in seed order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of games
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        scenario = %config.scenario.name,
        strategy = %config.strategy.name,
        "Starting batch run"
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let games: Vec<GameMetrics> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let metrics = run_game(config.game_config(seed));

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 10 == 0 {
                debug!("Progress: {}/{}", done, config.game_count);
            }
            metrics
        })
        .collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
    }
}

/// Play the same seed `runs` times and compare final state hashes.
///
/// Returns `true` when every run ended in the identical state.
pub fn verify_determinism(
    scenario: &ScenarioConfig,
    strategy: &DefenderStrategy,
    seed: u64,
    runs: u32,
) -> bool {
    let hashes: Vec<u64> = (0..runs.max(1))
        .map(|_| {
            run_game(GameConfig::new(scenario.clone(), strategy.clone(), seed)).final_state_hash
        })
        .collect();

    hashes.windows(2).all(|w| w[0] == w[1])
}
