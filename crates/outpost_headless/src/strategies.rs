//! Scripted defender strategies for headless playtesting.
//!
//! A strategy stands in for the human player: on every player turn it picks
//! an outpost and a troop count. Strategies load from RON so balance runs can
//! compare play styles without recompiling.

use std::path::Path;

use outpost_core::outpost::{Outpost, OutpostId};
use outpost_core::rng::RandomSource;
use outpost_core::session::Session;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with this name.
    #[error("Unknown strategy preset: {0}")]
    UnknownPreset(String),
}

/// How a strategy picks the outpost to reinforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Targeting {
    /// Follow the advisor's suggestion.
    Advisor,
    /// The contested outpost holding the most aliens.
    MostAliens,
    /// The contested outpost closest to the base.
    Nearest,
    /// Never reinforce.
    Idle,
}

/// One reinforcement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Target outpost.
    pub outpost: OutpostId,
    /// Troops to send.
    pub troops: u32,
}

/// A scripted defender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderStrategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Target selection.
    pub targeting: Targeting,
    /// Fraction of the remaining reserve committed per order (0.0-1.0).
    pub commit_fraction: f64,
    /// Smallest order worth sending.
    pub min_commit: u32,
}

impl Default for DefenderStrategy {
    fn default() -> Self {
        Self::advisor()
    }
}

impl DefenderStrategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let strategy: DefenderStrategy = ron::from_str(&contents)?;
        Ok(strategy)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: DefenderStrategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Resolve a preset name, or load the argument as a RON file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, StrategyError> {
        match Self::preset(name_or_path) {
            Some(strategy) => Ok(strategy),
            None if name_or_path.ends_with(".ron") => Self::load(name_or_path),
            None => Err(StrategyError::UnknownPreset(name_or_path.to_string())),
        }
    }

    /// Look up a built-in preset by name.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "advisor" => Some(Self::advisor()),
            "firefighter" => Some(Self::firefighter()),
            "nearest" => Some(Self::nearest()),
            "idle" => Some(Self::idle()),
            _ => None,
        }
    }

    /// Follow the advisor, committing a fifth of the reserve each turn.
    #[must_use]
    pub fn advisor() -> Self {
        Self {
            name: "Advisor".to_string(),
            description: "Reinforces wherever the advisor points".to_string(),
            targeting: Targeting::Advisor,
            commit_fraction: 0.2,
            min_commit: 20,
        }
    }

    /// Throw heavy reinforcements at the worst infestation.
    #[must_use]
    pub fn firefighter() -> Self {
        Self {
            name: "Firefighter".to_string(),
            description: "Heavy orders against the largest infestation".to_string(),
            targeting: Targeting::MostAliens,
            commit_fraction: 0.35,
            min_commit: 40,
        }
    }

    /// Small, frequent orders to the closest outposts.
    #[must_use]
    pub fn nearest() -> Self {
        Self {
            name: "Nearest".to_string(),
            description: "Cheap orders to whatever is closest to the base".to_string(),
            targeting: Targeting::Nearest,
            commit_fraction: 0.1,
            min_commit: 15,
        }
    }

    /// Never reinforce. Baseline for how the attacker does unopposed.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            name: "Idle".to_string(),
            description: "Sends nothing".to_string(),
            targeting: Targeting::Idle,
            commit_fraction: 0.0,
            min_commit: 0,
        }
    }

    /// Troops to send given the current reserve. Zero means no order.
    #[must_use]
    pub fn troops_for(&self, reserve: u32) -> u32 {
        if self.targeting == Targeting::Idle {
            return 0;
        }
        let share = (f64::from(reserve) * self.commit_fraction.clamp(0.0, 1.0)).ceil() as u32;
        share.max(self.min_commit).min(reserve)
    }

    /// Pick this turn's order, if any.
    pub fn choose_order<R: RandomSource>(&self, session: &mut Session<R>) -> Option<Order> {
        let troops = self.troops_for(session.reserve());
        if troops == 0 {
            return None;
        }

        let outpost = match self.targeting {
            Targeting::Idle => return None,
            Targeting::Advisor => match session.suggestion() {
                Some(s) if session.outpost(s.outpost).is_some_and(Outpost::is_contested) => {
                    s.outpost
                }
                // A shallow search can name an outpost with no aliens to fight.
                _ => most_aliens(session.outposts())?,
            },
            Targeting::MostAliens => most_aliens(session.outposts())?,
            Targeting::Nearest => nearest(session.outposts())?,
        };

        Some(Order { outpost, troops })
    }
}

/// Contested outpost with the most aliens, first on ties.
fn most_aliens(outposts: &[Outpost]) -> Option<OutpostId> {
    let mut best: Option<(OutpostId, u32)> = None;
    for o in outposts.iter().filter(|o| o.is_contested()) {
        if best.map_or(true, |(_, aliens)| o.aliens > aliens) {
            best = Some((o.id, o.aliens));
        }
    }
    best.map(|(id, _)| id)
}

/// Contested outpost closest to the base, first on ties.
fn nearest(outposts: &[Outpost]) -> Option<OutpostId> {
    let mut best: Option<(OutpostId, f64)> = None;
    for o in outposts.iter().filter(|o| o.is_contested()) {
        if best.map_or(true, |(_, d)| o.distance_from_base < d) {
            best = Some((o.id, o.distance_from_base));
        }
    }
    best.map(|(id, _)| id)
}
