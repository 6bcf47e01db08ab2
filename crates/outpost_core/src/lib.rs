//! # Outpost Core
//!
//! Decision core for Outpost Defense: a defender spreads a limited troop
//! reserve across contested outposts while an automated attacker picks its
//! targets with depth-limited adversarial search.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO (apart from loading scenario configuration)
//! - No unseeded randomness: every random draw comes from a [`rng::RandomSource`]
//!   handed in by the caller
//! - No global state: attack memory, troop reserve and phase live in a
//!   [`session::Session`] owned by the caller
//!
//! ## Crate Structure
//!
//! - [`outpost`] - Outpost entity model, base location, state snapshots
//! - [`memory`] - Bounded recent-target memory
//! - [`combat`] - Stochastic combat resolution
//! - [`heuristic`] - Per-outpost priority scoring
//! - [`search`] - Minimax with alpha-beta pruning
//! - [`session`] - Turn orchestration and game-over detection
//! - [`setup`] - Scenario configuration and randomized outpost generation
//! - [`rng`] - Random source abstraction and seeded generator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod error;
pub mod heuristic;
pub mod memory;
pub mod outpost;
pub mod rng;
pub mod search;
pub mod session;
pub mod setup;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{
        resolve_alien_attack, resolve_opening_strike, resolve_player_defense, CombatOutcome,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::heuristic::{evaluate, Perspective};
    pub use crate::memory::AttackMemory;
    pub use crate::outpost::{Base, BaseLocation, Outpost, OutpostId, Position, Snapshot};
    pub use crate::rng::{GameRng, RandomSource};
    pub use crate::search::{decide, minimax, suggest_defense, DepthPolicy, SearchOutcome};
    pub use crate::session::{GameOutcome, GameOverReason, Phase, Session, Side, TurnEvent};
    pub use crate::setup::ScenarioConfig;
}
