//! Headless outpost defense runner.
//!
//! This binary runs the game without graphics, controlled via JSON on stdin/stdout.
//! Designed for terminal play, scripted defenders and balance runs.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p outpost_headless
//!
//! # Interactive game on a reproducible clock
//! cargo run -p outpost_headless -- run --seed 42 --game-clock
//!
//! # One scripted game, metrics on stdout
//! cargo run -p outpost_headless -- simulate --strategy nearest --seed 3
//!
//! # Run batch balance test
//! cargo run -p outpost_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p outpost_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outpost_core::setup::ScenarioConfig;
use outpost_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::{run_game, GameConfig},
    runner::{ClockMode, HeadlessRunner, RunnerConfig},
    strategies::DefenderStrategy,
};

#[derive(Parser)]
#[command(name = "outpost_headless")]
#[command(about = "Headless outpost defense runner for scripted play and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single interactive game over stdin/stdout
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Random seed (default: from the system clock)
        #[arg(long)]
        seed: Option<u64>,

        /// Advance time only on `wait` commands instead of the wall clock
        #[arg(long)]
        game_clock: bool,

        /// Output state after every command
        #[arg(long)]
        auto_state: bool,
    },

    /// Play one game with a scripted defender and print its metrics
    Simulate {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Strategy preset or RON file
        #[arg(long, default_value = "advisor")]
        strategy: String,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Cycle limit
        #[arg(long, default_value = "2000")]
        max_cycles: u32,
    },

    /// Run batch of games for balance testing
    Batch {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Strategy preset or RON file
        #[arg(long, default_value = "advisor")]
        strategy: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Verify determinism by replaying one seed
    Verify {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Strategy preset or RON file
        #[arg(long, default_value = "advisor")]
        strategy: String,

        /// Random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "3")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            game_clock,
            auto_state,
        }) => {
            cmd_run(scenario, seed, game_clock, auto_state);
        }
        Some(Commands::Simulate {
            scenario,
            strategy,
            seed,
            max_cycles,
        }) => {
            cmd_simulate(scenario, &strategy, seed, max_cycles);
        }
        Some(Commands::Batch {
            scenario,
            strategy,
            count,
            parallel,
            output,
            seed,
        }) => {
            cmd_batch(scenario, &strategy, count, parallel, output, seed);
        }
        Some(Commands::Verify {
            scenario,
            strategy,
            seed,
            runs,
        }) => {
            cmd_verify(scenario, &strategy, seed, runs);
        }
        None => {
            // Default: interactive mode
            cmd_run(None, None, false, false);
        }
    }
}

/// Load a scenario file, or the built-in default. Exits on failure.
fn load_scenario(path: Option<PathBuf>) -> ScenarioConfig {
    match path {
        Some(path) => ScenarioConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }),
        None => ScenarioConfig::default(),
    }
}

/// Resolve a strategy preset or file. Exits on failure.
fn load_strategy(name: &str) -> DefenderStrategy {
    DefenderStrategy::resolve(name).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("Presets: advisor, firefighter, nearest, idle");
        std::process::exit(1);
    })
}

/// Run a single interactive game
fn cmd_run(scenario: Option<PathBuf>, seed: Option<u64>, game_clock: bool, auto_state: bool) {
    tracing::info!("Starting interactive session");

    let config = RunnerConfig {
        scenario_path: scenario,
        seed,
        clock: if game_clock {
            ClockMode::Game
        } else {
            ClockMode::Wall
        },
        auto_state,
    };

    if let Err(e) = HeadlessRunner::with_config(config).run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Play one scripted game and print its metrics as JSON
fn cmd_simulate(scenario: Option<PathBuf>, strategy: &str, seed: u64, max_cycles: u32) {
    let config = GameConfig {
        max_cycles,
        ..GameConfig::new(load_scenario(scenario), load_strategy(strategy), seed)
    };

    let metrics = run_game(config);
    match serde_json::to_string_pretty(&metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run batch of games for balance testing
fn cmd_batch(
    scenario: Option<PathBuf>,
    strategy: &str,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
) {
    let batch_start = Instant::now();

    let mut config = BatchConfig::new(load_strategy(strategy), count)
        .with_scenario(load_scenario(scenario))
        .with_output(output.clone())
        .with_seed(seed);
    config.parallel_games = parallel;

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        eprintln!("Failed to save results: {e}");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Strategy: {}", results.config.strategy.name);
    eprintln!("Games: {}", summary.total_games);
    eprintln!("Duration: {:.1}s", batch_start.elapsed().as_secs_f64());
    eprintln!(
        "Throughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!(
        "\nDefender wins: {} ({:.1}%)",
        summary.defender_wins,
        summary.defender_win_rate * 100.0
    );
    eprintln!("Attacker wins: {}", summary.attacker_wins);
    if summary.unfinished > 0 {
        eprintln!("Unfinished: {}", summary.unfinished);
    }
    eprintln!("\nEndings:");
    for (reason, count) in &summary.reasons {
        eprintln!("  {reason}: {count}");
    }
    eprintln!(
        "\nAvg population retained: {:.1}%",
        summary.avg_population_retained * 100.0
    );
    eprintln!("Avg game length: {:.1}s", summary.avg_duration_secs);
    eprintln!("AI fallback rate: {:.1}%", summary.fallback_rate * 100.0);

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(scenario: Option<PathBuf>, strategy: &str, seed: u64, runs: u32) {
    tracing::info!(seed, runs, "Verifying determinism");

    let scenario = load_scenario(scenario);
    let strategy = load_strategy(strategy);

    if verify_determinism(&scenario, &strategy, seed, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
