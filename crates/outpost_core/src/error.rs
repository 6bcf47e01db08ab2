//! Error types for the decision core.
//!
//! Only requests the core cannot honour are errors. Combat against an empty
//! outpost, a search with no candidates and every game-over condition are
//! ordinary results.

use thiserror::Error;

use crate::outpost::OutpostId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the decision core.
#[derive(Debug, Error)]
pub enum GameError {
    /// No outpost with this identifier exists in the session.
    #[error("Outpost not found: {0}")]
    UnknownOutpost(OutpostId),

    /// A player order arrived outside the player's decision window.
    #[error("Not the player's turn (current phase: {0})")]
    NotPlayerTurn(String),

    /// The session has already reached a terminal outcome.
    #[error("Game is over")]
    GameOver,

    /// Reinforcement count was zero.
    #[error("Reinforcements must be a positive number of troops")]
    InvalidReinforcement,

    /// Not enough troops in the base reserve.
    #[error("Insufficient troops: requested {requested}, reserve holds {available}")]
    InsufficientTroops {
        /// Troops requested by the order.
        requested: u32,
        /// Troops left at the base.
        available: u32,
    },

    /// Failed to read a configuration file.
    #[error("Failed to read config '{path}': {source}")]
    ConfigLoad {
        /// Path to the file that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration parsed but describes an unplayable scenario.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a configuration file.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}
