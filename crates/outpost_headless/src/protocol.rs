//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Orders from the player or a controlling script
//! **Output (stdout):** Game state, suggestions and turn events
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}` followed by the opening wave
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command and reports what the attacker did in reply
//! 4. On game end, outputs `{"type":"game_over",...}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","outposts":7,"reserve":500}
//! <- {"type":"events","elapsed_secs":0.0,"events":[{"event":"opening_strike","outpost":0,"population":341},...]}
//! -> {"cmd":"suggest"}
//! <- {"type":"suggestion","outpost":3,"name":"Outpost D","score":182,"aliens":61}
//! -> {"cmd":"reinforce","outpost":3,"troops":"40"}
//! <- {"type":"events","elapsed_secs":0.0,"events":[{"event":"reinforced",...}]}
//! -> {"cmd":"wait","seconds":1.0}
//! <- {"type":"events","elapsed_secs":1.0,"events":[{"event":"ai_attack",...}]}
//! ```
//!
//! Troop counts may be sent as numbers or as the raw text the player typed;
//! [`validate_troops`] rejects anything that is not a positive whole number
//! within the reserve before the order reaches the session.

use std::time::Duration;

use outpost_core::error::GameError;
use outpost_core::outpost::Outpost;
use outpost_core::rng::RandomSource;
use outpost_core::session::{GameOutcome, GameOverReason, Session, Side, TurnEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Error type for protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Input line was not a valid command.
    #[error("Parse error: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// Troop count was not a whole number.
    #[error("Enter a valid number of troops")]
    NotANumber(String),
    /// Troop count was zero or negative.
    #[error("Enter a positive number of troops")]
    NotPositive,
    /// Troop count exceeded the reserve.
    #[error("Not enough troops at base (requested {requested}, reserve {reserve})")]
    ExceedsReserve {
        /// Troops asked for.
        requested: i64,
        /// Troops available.
        reserve: u32,
    },
    /// The session refused the order.
    #[error(transparent)]
    Game(#[from] GameError),
}

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Troop count as sent by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TroopInput {
    /// A JSON number.
    Count(i64),
    /// Raw text, validated the same way.
    Text(String),
}

impl TroopInput {
    /// The input as the player would have typed it.
    #[must_use]
    pub fn as_raw(&self) -> String {
        match self {
            TroopInput::Count(n) => n.to_string(),
            TroopInput::Text(s) => s.clone(),
        }
    }
}

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Report the full game state.
    State,
    /// Ask the advisor which outpost to reinforce.
    Suggest,
    /// Send troops from the base to an outpost.
    Reinforce {
        /// Target outpost id.
        outpost: u32,
        /// Troops to send.
        troops: TroopInput,
    },
    /// Let game time pass.
    Wait {
        /// Seconds to wait.
        #[serde(default = "default_wait_seconds")]
        seconds: f64,
    },
    /// Report the state hash.
    Hash,
    /// End the session.
    Quit,
}

fn default_wait_seconds() -> f64 {
    1.0
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Number of outposts in play.
        outposts: usize,
        /// Starting troop reserve.
        reserve: u32,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command that caused it.
        cmd: Option<String>,
    },

    /// Current game state.
    State(GameStateOutput),

    /// Advisor output. Fields are empty when there is nothing to suggest.
    Suggestion {
        /// Suggested outpost id.
        outpost: Option<u32>,
        /// Suggested outpost name.
        name: Option<String>,
        /// Defender priority of the outpost.
        score: Option<i64>,
        /// Aliens at the outpost.
        aliens: Option<u32>,
    },

    /// What happened since the last report.
    Events {
        /// Game time at the report.
        elapsed_secs: f64,
        /// Turn events in order.
        events: Vec<TurnEvent>,
    },

    /// State hash for determinism checks.
    StateHash {
        /// Game time at the report.
        elapsed_secs: f64,
        /// Hash value.
        hash: u64,
    },

    /// Game has ended.
    GameOver {
        /// "victory" or "defeat" from the player's side.
        result: GameResult,
        /// Why the game ended.
        reason: GameOverReason,
        /// Civilians left.
        population: u64,
        /// Aliens left.
        aliens: u64,
    },

    /// Goodbye message before shutdown.
    Bye,
}

/// Full state report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateOutput {
    /// Game time.
    pub elapsed_secs: f64,
    /// Time left before the timeout.
    pub time_remaining_secs: f64,
    /// Current phase.
    pub phase: String,
    /// Troops at the base.
    pub reserve: u32,
    /// Every outpost.
    pub outposts: Vec<OutpostState>,
    /// Recent attacker targets, oldest first.
    pub recent_targets: Vec<u32>,
    /// State hash.
    pub hash: u64,
}

/// State of a single outpost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutpostState {
    /// Outpost id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Civilians.
    pub population: u32,
    /// Garrison.
    pub military: u32,
    /// Aliens.
    pub aliens: u32,
    /// Damage percent.
    pub damage: u32,
    /// Hit this cycle.
    pub under_attack: bool,
    /// Distance to the base.
    pub distance: f64,
}

impl From<&Outpost> for OutpostState {
    fn from(o: &Outpost) -> Self {
        Self {
            id: o.id.0,
            name: o.name.clone(),
            x: o.position.x,
            y: o.position.y,
            population: o.population,
            military: o.military,
            aliens: o.aliens,
            damage: o.damage,
            under_attack: o.under_attack,
            distance: o.distance_from_base,
        }
    }
}

/// Game result from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// The player won.
    Victory,
    /// The attacker won.
    Defeat,
}

impl From<Side> for GameResult {
    fn from(side: Side) -> Self {
        match side {
            Side::Defender => GameResult::Victory,
            Side::Attacker => GameResult::Defeat,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate a troop count typed by the player.
///
/// Accepts surrounding whitespace. Rejects anything that is not a whole
/// number, anything not positive, and anything above `reserve`.
pub fn validate_troops(raw: &str, reserve: u32) -> Result<u32, ProtocolError> {
    let requested: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ProtocolError::NotANumber(raw.to_string()))?;

    if requested > i64::from(reserve) {
        return Err(ProtocolError::ExceedsReserve { requested, reserve });
    }
    if requested <= 0 {
        return Err(ProtocolError::NotPositive);
    }

    u32::try_from(requested).map_err(|_| ProtocolError::NotANumber(raw.to_string()))
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(outposts: usize, reserve: u32) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            outposts,
            reserve,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Build a state report.
    pub fn state<R: RandomSource>(session: &Session<R>, elapsed: Duration) -> Self {
        Self::State(GameStateOutput {
            elapsed_secs: elapsed.as_secs_f64(),
            time_remaining_secs: session.time_remaining(elapsed).as_secs_f64(),
            phase: session.phase().to_string(),
            reserve: session.reserve(),
            outposts: session.outposts().iter().map(OutpostState::from).collect(),
            recent_targets: session.memory().iter().map(|id| id.0).collect(),
            hash: session.state_hash(),
        })
    }

    /// Build the advisor's answer.
    pub fn suggestion<R: RandomSource>(session: &mut Session<R>) -> Self {
        match session.suggestion() {
            Some(s) => Self::Suggestion {
                outpost: Some(s.outpost.0),
                name: session.outpost(s.outpost).map(|o| o.name.clone()),
                score: Some(s.score),
                aliens: Some(s.aliens),
            },
            None => Self::Suggestion {
                outpost: None,
                name: None,
                score: None,
                aliens: None,
            },
        }
    }

    /// Build the final report.
    pub fn game_over<R: RandomSource>(session: &Session<R>, outcome: GameOutcome) -> Self {
        Self::GameOver {
            result: outcome.winner.into(),
            reason: outcome.reason,
            population: session.total_population(),
            aliens: session.total_aliens(),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get command name for error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Suggest => "suggest",
            Self::Reinforce { .. } => "reinforce",
            Self::Wait { .. } => "wait",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
