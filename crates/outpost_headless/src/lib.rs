//! Headless outpost defense runner for scripted play and balance testing.
//!
//! This crate drives an [`outpost_core`] session without any presentation
//! layer. It offers:
//!
//! - **Interactive play**: a JSON-lines session on stdin/stdout, usable by a
//!   human at a terminal or by a controlling script
//! - **Scripted defenders**: RON-loadable strategies that play the defender
//! - **Batch runs**: many seeded games in parallel with aggregated metrics
//! - **Determinism checks**: replay a seed and compare final state hashes
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (state, suggest, reinforce, wait)
//! - **stdout**: Responses and turn events (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See the [`protocol`] module for the command/response format.
//!
//! # Example
//!
//! ```bash
//! # Play interactively with a fixed seed
//! cargo run -p outpost_headless -- run --seed 42
//!
//! # Simulate one game with a scripted defender
//! cargo run -p outpost_headless -- simulate --strategy firefighter --seed 7
//!
//! # Batch balance run
//! cargo run -p outpost_headless -- batch --count 500 --strategy advisor --output results/
//! ```

pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameConfig, GameRunner};
pub use metrics::{BatchSummary, GameMetrics};
pub use protocol::{validate_troops, Command, Response};
pub use runner::{ClockMode, HeadlessRunner, RunnerConfig};
pub use strategies::{DefenderStrategy, Targeting};
