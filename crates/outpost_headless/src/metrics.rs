//! Game metrics collection for balance analysis.
//!
//! [`GameMetrics`] is filled from the [`TurnEvent`] stream of one game;
//! [`BatchSummary`] aggregates many games into win rates and averages.

use std::collections::BTreeMap;
use std::time::Duration;

use outpost_core::combat::CombatOutcome;
use outpost_core::rng::RandomSource;
use outpost_core::session::{GameOverReason, Session, Side, TurnEvent};
use serde::{Deserialize, Serialize};

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Defender strategy name.
    pub strategy: String,
    /// Random seed used.
    pub seed: u64,
    /// Game time when the run stopped.
    pub duration_secs: f64,
    /// Winner, `None` if the run hit its cycle limit first.
    pub winner: Option<Side>,
    /// How the game ended.
    pub reason: Option<GameOverReason>,

    /// Outposts in play.
    pub outposts: u32,
    /// Outposts hit by the opening wave.
    pub opening_strikes: u32,
    /// Civilians at the start.
    pub initial_population: u64,
    /// Aliens at the start.
    pub initial_aliens: u64,
    /// Civilians at the end.
    pub final_population: u64,
    /// Aliens at the end.
    pub final_aliens: u64,
    /// Troops left at the base.
    pub reserve_left: u32,

    // === Player ===
    /// Reinforcement orders resolved.
    pub reinforcements: u32,
    /// Troops sent in total.
    pub troops_sent: u64,
    /// Reinforcements that beat the aliens.
    pub reinforcements_won: u32,

    // === Attacker ===
    /// Attacker turns that struck an outpost.
    pub ai_attacks: u32,
    /// Attacks the garrison repelled.
    pub ai_attacks_repelled: u32,
    /// Attacks whose target came from the fallback pick.
    pub fallback_attacks: u32,
    /// Attacker turns with no valid target.
    pub regroups: u32,

    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(
        game_id: impl Into<String>,
        scenario: impl Into<String>,
        strategy: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            strategy: strategy.into(),
            seed,
            ..Default::default()
        }
    }

    /// Capture the starting totals of a session.
    pub fn record_start<R: RandomSource>(&mut self, session: &Session<R>) {
        self.outposts = session.outposts().len() as u32;
        self.initial_population = session.total_population();
        self.initial_aliens = session.total_aliens();
    }

    /// Count one event.
    pub fn record_event(&mut self, event: &TurnEvent) {
        match event {
            TurnEvent::OpeningStrike { .. } => self.opening_strikes += 1,
            TurnEvent::Reinforced {
                troops, outcome, ..
            } => {
                self.reinforcements += 1;
                self.troops_sent += u64::from(*troops);
                if *outcome == CombatOutcome::DefendersHeld {
                    self.reinforcements_won += 1;
                }
            }
            TurnEvent::AiAttack {
                outcome, fallback, ..
            } => {
                self.ai_attacks += 1;
                if *outcome == CombatOutcome::DefendersHeld {
                    self.ai_attacks_repelled += 1;
                }
                if *fallback {
                    self.fallback_attacks += 1;
                }
            }
            TurnEvent::AiRegroup => self.regroups += 1,
            TurnEvent::GameOver(outcome) => {
                self.winner = Some(outcome.winner);
                self.reason = Some(outcome.reason);
            }
        }
    }

    /// Finalize with the end state of the session.
    pub fn finalize<R: RandomSource>(&mut self, session: &Session<R>, elapsed: Duration) {
        self.duration_secs = elapsed.as_secs_f64();
        self.final_population = session.total_population();
        self.final_aliens = session.total_aliens();
        self.reserve_left = session.reserve();
        self.final_state_hash = session.state_hash();
        if let Some(outcome) = session.outcome() {
            self.winner = Some(outcome.winner);
            self.reason = Some(outcome.reason);
        }
    }

    /// Fraction of the starting civilians still alive.
    #[must_use]
    pub fn population_retained(&self) -> f64 {
        if self.initial_population == 0 {
            return 0.0;
        }
        self.final_population as f64 / self.initial_population as f64
    }
}

/// Aggregate statistics over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games the player won.
    pub defender_wins: u32,
    /// Games the attacker won.
    pub attacker_wins: u32,
    /// Games cut off by the cycle limit.
    pub unfinished: u32,
    /// Player win rate over all games.
    pub defender_win_rate: f64,
    /// Game-over reasons and their counts.
    pub reasons: BTreeMap<String, u32>,
    /// Average game duration in seconds.
    pub avg_duration_secs: f64,
    /// Shortest game.
    pub min_duration_secs: f64,
    /// Longest game.
    pub max_duration_secs: f64,
    /// Average fraction of civilians that survived.
    pub avg_population_retained: f64,
    /// Average reinforcement orders per game.
    pub avg_reinforcements: f64,
    /// Average attacker strikes per game.
    pub avg_ai_attacks: f64,
    /// Share of attacker strikes chosen by the fallback pick.
    pub fallback_rate: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let n = games.len() as f64;
        let mut summary = Self {
            total_games: games.len() as u32,
            min_duration_secs: f64::INFINITY,
            ..Default::default()
        };

        let mut duration_sum = 0.0;
        let mut retained_sum = 0.0;
        let mut reinforcements = 0u64;
        let mut attacks = 0u64;
        let mut fallbacks = 0u64;

        for game in games {
            match game.winner {
                Some(Side::Defender) => summary.defender_wins += 1,
                Some(Side::Attacker) => summary.attacker_wins += 1,
                None => summary.unfinished += 1,
            }
            if let Some(reason) = game.reason {
                *summary.reasons.entry(format!("{reason:?}")).or_default() += 1;
            }

            duration_sum += game.duration_secs;
            summary.min_duration_secs = summary.min_duration_secs.min(game.duration_secs);
            summary.max_duration_secs = summary.max_duration_secs.max(game.duration_secs);

            retained_sum += game.population_retained();
            reinforcements += u64::from(game.reinforcements);
            attacks += u64::from(game.ai_attacks);
            fallbacks += u64::from(game.fallback_attacks);
        }

        summary.defender_win_rate = f64::from(summary.defender_wins) / n;
        summary.avg_duration_secs = duration_sum / n;
        summary.avg_population_retained = retained_sum / n;
        summary.avg_reinforcements = reinforcements as f64 / n;
        summary.avg_ai_attacks = attacks as f64 / n;
        summary.fallback_rate = if attacks == 0 {
            0.0
        } else {
            fallbacks as f64 / attacks as f64
        };

        summary
    }

    /// Whether the player's win rate lies within `tolerance` of a coin flip.
    #[must_use]
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.defender_win_rate - 0.5).abs() <= tolerance
    }
}
