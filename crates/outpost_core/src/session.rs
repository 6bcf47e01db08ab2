//! Turn orchestration.
//!
//! A [`Session`] owns everything one game mutates: the outposts, the base and
//! its troop reserve, the attacker's memory and the random stream. It moves
//! through four phases:
//!
//! ```text
//! OpeningWave ──▶ PlayerTurn ──reinforce──▶ AiTurn ──▶ PlayerTurn ...
//!      └──────────────┴───────────────────────┴──▶ GameOver
//! ```
//!
//! The caller drives the session by calling [`Session::poll`] once per frame
//! or tick with the elapsed game time, and by submitting the player's orders
//! through [`Session::submit_reinforcements`]. The session never reads a clock
//! itself.
//!
//! Game-over conditions are checked once at the start of every poll, before
//! any turn logic runs.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::{
    resolve_alien_attack, resolve_opening_strike, resolve_player_defense, CombatOutcome,
};
use crate::error::{GameError, Result};
use crate::heuristic::{evaluate, Perspective};
use crate::memory::AttackMemory;
use crate::outpost::{Base, Outpost, OutpostId};
use crate::rng::{GameRng, RandomSource};
use crate::search::{self, suggest_defense};
use crate::setup::{generate_outposts, ScenarioConfig};

/// Timeout victory needs more than this many civilians per remaining alien.
pub const TIMEOUT_POPULATION_RATIO: u64 = 3;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player.
    Defender,
    /// The AI.
    Attacker,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Every civilian is gone.
    DefenderEliminated,
    /// Every alien is gone.
    AttackerEliminated,
    /// The reserve is empty and no outpost holds a garrison.
    BaseDepletedAndNoMilitary,
    /// Time ran out; decided on remaining civilians against aliens.
    Timeout,
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Why the game ended.
    pub reason: GameOverReason,
    /// Who won.
    pub winner: Side,
}

impl GameOutcome {
    /// Whether the player won.
    #[must_use]
    pub fn defender_won(&self) -> bool {
        self.winner == Side::Defender
    }
}

/// Current phase of the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Scripted light strike against every contested outpost. Runs once.
    OpeningWave,
    /// Waiting for the player's reinforcement order.
    PlayerTurn,
    /// The attacker picks and strikes a target once its delay has passed.
    AiTurn,
    /// Terminal.
    GameOver(GameOutcome),
}

impl Phase {
    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::OpeningWave => write!(f, "opening wave"),
            Phase::PlayerTurn => write!(f, "player turn"),
            Phase::AiTurn => write!(f, "AI turn"),
            Phase::GameOver(_) => write!(f, "game over"),
        }
    }
}

/// Something that happened since the last poll, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The opening wave hit an outpost.
    OpeningStrike {
        /// Outpost hit.
        outpost: OutpostId,
        /// Civilians left afterwards.
        population: u32,
    },
    /// The player's reinforcements fought at an outpost.
    Reinforced {
        /// Outpost reinforced.
        outpost: OutpostId,
        /// Troops taken from the reserve.
        troops: u32,
        /// How the fight went.
        outcome: CombatOutcome,
    },
    /// The attacker struck an outpost.
    AiAttack {
        /// Outpost attacked.
        outpost: OutpostId,
        /// How the fight went, from the defenders' side.
        outcome: CombatOutcome,
        /// Whether the target came from the fallback pick instead of the search.
        fallback: bool,
    },
    /// The attacker had no valid target and passed.
    AiRegroup,
    /// The game ended.
    GameOver(GameOutcome),
}

/// Advice for the player's next reinforcement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested outpost.
    pub outpost: OutpostId,
    /// Defender priority of that outpost.
    pub score: i64,
    /// Aliens currently there.
    pub aliens: u32,
    /// Search value behind the suggestion.
    pub value: f64,
}

/// One game in progress.
#[derive(Debug, Clone)]
pub struct Session<R = GameRng> {
    config: ScenarioConfig,
    outposts: Vec<Outpost>,
    base: Base,
    memory: AttackMemory,
    rng: R,
    phase: Phase,
    /// Earliest elapsed time at which the attacker may act.
    ai_ready_at: Duration,
    ai_turns: u32,
    player_turns: u32,
    last_ai_target: Option<OutpostId>,
    pending: Vec<TurnEvent>,
}

impl Session<GameRng> {
    /// Roll a new game from a scenario and seed.
    #[must_use]
    pub fn generate(config: ScenarioConfig, seed: u64) -> Self {
        let mut rng = GameRng::seeded(seed);
        let base = Base::new(config.base_position, config.base_troops);
        let outposts = generate_outposts(&config, &base, &mut rng);
        tracing::info!(
            seed,
            outposts = outposts.len(),
            troops = base.troops,
            "Session generated"
        );
        Session::new(config, outposts, base, rng)
    }
}

impl<R: RandomSource> Session<R> {
    /// Start a game over the given outposts. The first poll runs the opening wave.
    #[must_use]
    pub fn new(config: ScenarioConfig, outposts: Vec<Outpost>, base: Base, rng: R) -> Self {
        let memory = AttackMemory::with_capacity(config.memory_capacity);
        Self {
            config,
            outposts,
            base,
            memory,
            rng,
            phase: Phase::OpeningWave,
            ai_ready_at: Duration::ZERO,
            ai_turns: 0,
            player_turns: 0,
            last_ai_target: None,
            pending: Vec::new(),
        }
    }

    /// Advance the session to `elapsed` game time.
    ///
    /// Returns the events produced since the previous poll, including any
    /// reinforcement results submitted in between.
    pub fn poll(&mut self, elapsed: Duration) -> Vec<TurnEvent> {
        let mut events = std::mem::take(&mut self.pending);

        if self.phase.is_over() {
            return events;
        }

        if let Some(outcome) = self.check_game_over(elapsed) {
            tracing::info!(
                reason = ?outcome.reason,
                winner = ?outcome.winner,
                population = self.total_population(),
                aliens = self.total_aliens(),
                "Game over"
            );
            self.phase = Phase::GameOver(outcome);
            events.push(TurnEvent::GameOver(outcome));
            return events;
        }

        match self.phase {
            Phase::OpeningWave if elapsed >= self.ai_ready_at => {
                self.opening_wave(&mut events);
                self.phase = Phase::PlayerTurn;
            }
            Phase::AiTurn if elapsed >= self.ai_ready_at => {
                self.ai_turn(&mut events);
                self.phase = Phase::PlayerTurn;
            }
            _ => {}
        }

        events
    }

    /// Send `troops` from the reserve to reinforce `outpost`.
    ///
    /// On a resolved fight the troops leave the reserve and the attacker moves
    /// next, after the configured delay. A [`CombatOutcome::Skipped`] result
    /// (no aliens at the target) spends nothing and keeps the turn with the
    /// player.
    ///
    /// # Errors
    ///
    /// Fails when the game is over, it is not the player's turn, no troops are
    /// sent, the reserve is too small, or the outpost does not exist.
    pub fn submit_reinforcements(
        &mut self,
        outpost: OutpostId,
        troops: u32,
        elapsed: Duration,
    ) -> Result<CombatOutcome> {
        match self.phase {
            Phase::PlayerTurn => {}
            Phase::GameOver(_) => return Err(GameError::GameOver),
            other => return Err(GameError::NotPlayerTurn(other.to_string())),
        }
        if troops == 0 {
            return Err(GameError::InvalidReinforcement);
        }
        if troops > self.base.troops {
            return Err(GameError::InsufficientTroops {
                requested: troops,
                available: self.base.troops,
            });
        }
        let index = self
            .index_of(outpost)
            .ok_or(GameError::UnknownOutpost(outpost))?;

        let outcome =
            resolve_player_defense(&mut self.outposts[index], troops, &self.base, &mut self.rng);

        if outcome.is_resolved() {
            self.base.withdraw(troops);
            self.player_turns += 1;
            self.phase = Phase::AiTurn;
            self.ai_ready_at = elapsed + self.config.ai_delay();
            self.pending.push(TurnEvent::Reinforced {
                outpost,
                troops,
                outcome,
            });
            tracing::debug!(
                %outpost,
                troops,
                ?outcome,
                reserve = self.base.troops,
                "Reinforcements sent"
            );
        }

        Ok(outcome)
    }

    /// Advisory defender search for the player's next move.
    ///
    /// Leaves the outposts and the attack memory untouched.
    pub fn suggestion(&mut self) -> Option<Suggestion> {
        let result = suggest_defense(
            &mut self.outposts,
            &self.base,
            &self.memory,
            self.config.advisor_depth,
        );
        let id = result.target?;
        let outpost = self.outpost(id)?;
        Some(Suggestion {
            outpost: id,
            score: evaluate(outpost, Perspective::Defender, &self.base, &self.memory),
            aliens: outpost.aliens,
            value: result.value,
        })
    }

    /// Terminal outcome of the current state at `elapsed`, if any.
    #[must_use]
    pub fn check_game_over(&self, elapsed: Duration) -> Option<GameOutcome> {
        let (reason, winner) = if self.outposts.iter().all(|o| o.population == 0) {
            (GameOverReason::DefenderEliminated, Side::Attacker)
        } else if self.outposts.iter().all(|o| o.aliens == 0) {
            (GameOverReason::AttackerEliminated, Side::Defender)
        } else if self.base.is_depleted() && self.outposts.iter().all(|o| o.military == 0) {
            (GameOverReason::BaseDepletedAndNoMilitary, Side::Attacker)
        } else if elapsed >= self.config.duration() {
            let aliens = self.total_aliens();
            let held = self.total_population() > aliens * TIMEOUT_POPULATION_RATIO || aliens == 0;
            let winner = if held { Side::Defender } else { Side::Attacker };
            (GameOverReason::Timeout, winner)
        } else {
            return None;
        };

        Some(GameOutcome { reason, winner })
    }

    fn opening_wave(&mut self, events: &mut Vec<TurnEvent>) {
        let rebaseline = self.config.rebaseline_after_opening_wave;
        for outpost in &mut self.outposts {
            if resolve_opening_strike(outpost, &mut self.rng, rebaseline) {
                self.memory.record(outpost.id);
                events.push(TurnEvent::OpeningStrike {
                    outpost: outpost.id,
                    population: outpost.population,
                });
            }
        }
        tracing::debug!(
            struck = events.len(),
            memory = self.memory.len(),
            "Opening wave finished"
        );
    }

    fn ai_turn(&mut self, events: &mut Vec<TurnEvent>) {
        for outpost in &mut self.outposts {
            outpost.under_attack = false;
        }

        let depth = self.config.ai_depth.depth_for(self.outposts.len());
        let decision = search::minimax(
            &mut self.outposts,
            depth,
            Perspective::Attacker,
            f64::NEG_INFINITY,
            f64::INFINITY,
            &self.base,
            &self.memory,
        );

        let valid: Vec<usize> = self
            .outposts
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_contested())
            .map(|(i, _)| i)
            .collect();

        let searched = decision
            .target
            .and_then(|id| self.index_of(id))
            .filter(|&i| self.outposts[i].is_contested());

        let (target, fallback) = match (searched, valid.as_slice()) {
            (Some(index), _) => (Some(index), false),
            (None, []) => (None, false),
            (None, [only]) => (Some(*only), true),
            (None, many) => (Some(many[self.rng.pick(many.len())]), true),
        };

        self.ai_turns += 1;

        let Some(index) = target else {
            tracing::debug!(turn = self.ai_turns, "AI regrouping");
            events.push(TurnEvent::AiRegroup);
            return;
        };

        let outcome = resolve_alien_attack(&mut self.outposts[index], &mut self.rng);
        let id = self.outposts[index].id;
        if outcome.is_resolved() {
            self.memory.record(id);
            self.last_ai_target = Some(id);
        }

        tracing::debug!(
            turn = self.ai_turns,
            target = %id,
            depth,
            value = decision.value,
            fallback,
            ?outcome,
            "AI attacked"
        );

        events.push(TurnEvent::AiAttack {
            outpost: id,
            outcome,
            fallback,
        });
    }

    fn index_of(&self, id: OutpostId) -> Option<usize> {
        self.outposts.iter().position(|o| o.id == id)
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.phase.is_over()
    }

    /// Terminal outcome, once reached.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            Phase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// All outposts.
    #[must_use]
    pub fn outposts(&self) -> &[Outpost] {
        &self.outposts
    }

    /// Look up one outpost.
    #[must_use]
    pub fn outpost(&self, id: OutpostId) -> Option<&Outpost> {
        self.outposts.iter().find(|o| o.id == id)
    }

    /// The base.
    #[must_use]
    pub const fn base(&self) -> &Base {
        &self.base
    }

    /// Troops left in the reserve.
    #[must_use]
    pub const fn reserve(&self) -> u32 {
        self.base.troops
    }

    /// Recent attacker targets.
    #[must_use]
    pub const fn memory(&self) -> &AttackMemory {
        &self.memory
    }

    /// Scenario this session was built from.
    #[must_use]
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Outpost the attacker last struck.
    #[must_use]
    pub const fn last_ai_target(&self) -> Option<OutpostId> {
        self.last_ai_target
    }

    /// Attacker turns taken, not counting the opening wave.
    #[must_use]
    pub const fn ai_turns(&self) -> u32 {
        self.ai_turns
    }

    /// Reinforcement orders resolved.
    #[must_use]
    pub const fn player_turns(&self) -> u32 {
        self.player_turns
    }

    /// Time left before the timeout check fires.
    #[must_use]
    pub fn time_remaining(&self, elapsed: Duration) -> Duration {
        self.config.duration().saturating_sub(elapsed)
    }

    /// Civilians across all outposts.
    #[must_use]
    pub fn total_population(&self) -> u64 {
        self.outposts.iter().map(|o| u64::from(o.population)).sum()
    }

    /// Aliens across all outposts.
    #[must_use]
    pub fn total_aliens(&self) -> u64 {
        self.outposts.iter().map(|o| u64::from(o.aliens)).sum()
    }

    /// Garrison troops across all outposts.
    #[must_use]
    pub fn total_military(&self) -> u64 {
        self.outposts.iter().map(|o| u64::from(o.military)).sum()
    }

    /// Hash of the mutable game state.
    ///
    /// Two sessions with the same seed and the same orders hash equal at every
    /// step.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.phase.hash(&mut hasher);
        self.base.troops.hash(&mut hasher);
        self.ai_turns.hash(&mut hasher);
        self.player_turns.hash(&mut hasher);

        self.outposts.len().hash(&mut hasher);
        for outpost in &self.outposts {
            outpost.id.hash(&mut hasher);
            outpost.population.hash(&mut hasher);
            outpost.military.hash(&mut hasher);
            outpost.aliens.hash(&mut hasher);
            outpost.damage.hash(&mut hasher);
            outpost.original_population.hash(&mut hasher);
            outpost.under_attack.hash(&mut hasher);
        }

        for id in self.memory.iter() {
            id.hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outpost::Position;

    /// Always draws the same value.
    #[derive(Debug, Clone)]
    struct Constant(f64);

    impl RandomSource for Constant {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    const BASE_AT: Position = Position::new(0.0, 0.0);

    fn outpost(id: u32, population: u32, military: u32, aliens: u32) -> Outpost {
        Outpost::new(
            OutpostId(id),
            format!("Outpost {id}"),
            Position::new(200.0 + 150.0 * f64::from(id), 100.0),
            population,
            military,
            aliens,
            &BASE_AT,
        )
    }

    fn session(outposts: Vec<Outpost>, troops: u32, draw: f64) -> Session<Constant> {
        Session::new(
            ScenarioConfig::default(),
            outposts,
            Base::new(BASE_AT, troops),
            Constant(draw),
        )
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_opening_wave_hits_contested_outposts() {
        let mut s = session(
            vec![
                outpost(0, 400, 20, 60),
                outpost(1, 300, 0, 0),
                outpost(2, 250, 10, 50),
            ],
            500,
            0.5,
        );
        assert_eq!(s.phase(), Phase::OpeningWave);

        let events = s.poll(Duration::ZERO);
        assert_eq!(s.phase(), Phase::PlayerTurn);
        let struck: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TurnEvent::OpeningStrike { outpost, .. } => Some(*outpost),
                _ => None,
            })
            .collect();
        assert_eq!(struck, vec![OutpostId(0), OutpostId(2)]);
        assert_eq!(s.memory().len(), 2);
        assert!(s.outposts()[0].population < 400);
        assert_eq!(s.outposts()[1].population, 300);
        assert!(s.outposts()[0].under_attack);
        // Baseline moved to the survivors
        assert_eq!(s.outposts()[0].original_population, s.outposts()[0].population);
    }

    #[test]
    fn test_opening_wave_without_rebaseline_keeps_damage() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 100, 0, 5)], 500, 0.5);
        s.config.rebaseline_after_opening_wave = false;
        s.poll(Duration::ZERO);
        assert_eq!(s.outposts()[0].original_population, 400);
        assert!(s.outposts()[0].damage > 0);
    }

    #[test]
    fn test_player_turn_waits() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 40)], 500, 0.5);
        s.poll(Duration::ZERO);
        let hash = s.state_hash();
        for t in 1..10 {
            assert!(s.poll(secs(t)).is_empty());
        }
        assert_eq!(s.phase(), Phase::PlayerTurn);
        assert_eq!(s.state_hash(), hash);
    }

    #[test]
    fn test_reinforcement_hands_turn_to_ai_after_delay() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 40)], 500, 0.0);
        s.poll(Duration::ZERO);

        // A zero draw always wins the defense
        let outcome = s.submit_reinforcements(OutpostId(0), 50, secs(10)).unwrap();
        assert_eq!(outcome, CombatOutcome::DefendersHeld);
        assert_eq!(s.reserve(), 450);
        assert_eq!(s.phase(), Phase::AiTurn);
        assert_eq!(s.player_turns(), 1);

        let events = s.poll(secs(10));
        assert!(matches!(
            events.as_slice(),
            [TurnEvent::Reinforced { outpost: OutpostId(0), troops: 50, .. }]
        ));
        assert_eq!(s.phase(), Phase::AiTurn);

        let events = s.poll(secs(11));
        assert_eq!(s.phase(), Phase::PlayerTurn);
        assert_eq!(s.ai_turns(), 1);
        assert!(matches!(
            events.as_slice(),
            [TurnEvent::AiAttack { outpost: OutpostId(1), .. }]
        ));
        assert_eq!(s.memory().most_recent(), Some(OutpostId(1)));
        assert_eq!(s.last_ai_target(), Some(OutpostId(1)));
    }

    #[test]
    fn test_skipped_reinforcement_keeps_turn() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 0)], 500, 0.5);
        s.poll(Duration::ZERO);
        let outcome = s.submit_reinforcements(OutpostId(1), 50, secs(1)).unwrap();
        assert_eq!(outcome, CombatOutcome::Skipped);
        assert_eq!(s.reserve(), 500);
        assert_eq!(s.phase(), Phase::PlayerTurn);
    }

    #[test]
    fn test_rejected_orders() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 40)], 100, 0.5);
        assert!(matches!(
            s.submit_reinforcements(OutpostId(0), 10, Duration::ZERO),
            Err(GameError::NotPlayerTurn(_))
        ));
        s.poll(Duration::ZERO);
        assert!(matches!(
            s.submit_reinforcements(OutpostId(0), 0, Duration::ZERO),
            Err(GameError::InvalidReinforcement)
        ));
        assert!(matches!(
            s.submit_reinforcements(OutpostId(0), 101, Duration::ZERO),
            Err(GameError::InsufficientTroops { requested: 101, available: 100 })
        ));
        assert!(matches!(
            s.submit_reinforcements(OutpostId(9), 10, Duration::ZERO),
            Err(GameError::UnknownOutpost(OutpostId(9)))
        ));
        assert_eq!(s.reserve(), 100);
    }

    #[test]
    fn test_ai_regroups_without_targets() {
        // Civilians and aliens never share an outpost
        let mut s = session(vec![outpost(0, 400, 0, 0), outpost(1, 0, 0, 40)], 500, 0.5);
        s.poll(Duration::ZERO);
        s.phase = Phase::AiTurn;
        let events = s.poll(secs(1));
        assert_eq!(events, vec![TurnEvent::AiRegroup]);
        assert_eq!(s.phase(), Phase::PlayerTurn);
        assert!(s.memory().is_empty());
    }

    #[test]
    fn test_ai_falls_back_to_sole_target() {
        // Only outpost 1 holds both civilians and aliens
        let mut s = session(
            vec![outpost(0, 1000, 0, 0), outpost(1, 10, 0, 1), outpost(2, 0, 0, 90)],
            500,
            0.99,
        );
        s.phase = Phase::AiTurn;
        let events = s.poll(secs(1));
        match events.as_slice() {
            [TurnEvent::AiAttack { outpost, .. }] => assert_eq!(*outpost, OutpostId(1)),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_ai_resets_under_attack_flags() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 40)], 500, 0.5);
        s.poll(Duration::ZERO);
        assert!(s.outposts().iter().all(|o| o.under_attack));
        s.phase = Phase::AiTurn;
        s.poll(secs(1));
        assert_eq!(s.outposts().iter().filter(|o| o.under_attack).count(), 1);
    }

    #[test]
    fn test_game_over_defender_eliminated() {
        let mut s = session(vec![outpost(0, 0, 20, 60), outpost(1, 0, 0, 40)], 500, 0.5);
        let events = s.poll(Duration::ZERO);
        let outcome = GameOutcome {
            reason: GameOverReason::DefenderEliminated,
            winner: Side::Attacker,
        };
        assert_eq!(events, vec![TurnEvent::GameOver(outcome)]);
        assert_eq!(s.outcome(), Some(outcome));
        assert!(matches!(
            s.submit_reinforcements(OutpostId(0), 1, Duration::ZERO),
            Err(GameError::GameOver)
        ));
        assert!(s.poll(secs(5)).is_empty());
    }

    #[test]
    fn test_game_over_attacker_eliminated() {
        let s = session(vec![outpost(0, 100, 0, 0), outpost(1, 50, 0, 0)], 500, 0.5);
        let outcome = s.check_game_over(Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, GameOverReason::AttackerEliminated);
        assert!(outcome.defender_won());
    }

    #[test]
    fn test_game_over_base_depleted() {
        let s = session(vec![outpost(0, 100, 0, 10), outpost(1, 50, 0, 0)], 0, 0.5);
        let outcome = s.check_game_over(Duration::ZERO).unwrap();
        assert_eq!(outcome.reason, GameOverReason::BaseDepletedAndNoMilitary);
        assert_eq!(outcome.winner, Side::Attacker);

        let garrisoned = session(vec![outpost(0, 100, 5, 10)], 0, 0.5);
        assert_eq!(garrisoned.check_game_over(Duration::ZERO), None);
    }

    #[test]
    fn test_timeout_compares_population_to_aliens() {
        let held = session(vec![outpost(0, 301, 0, 100)], 500, 0.5);
        let outcome = held.check_game_over(secs(300)).unwrap();
        assert_eq!(outcome.reason, GameOverReason::Timeout);
        assert_eq!(outcome.winner, Side::Defender);

        let lost = session(vec![outpost(0, 300, 0, 100)], 500, 0.5);
        assert_eq!(lost.check_game_over(secs(300)).unwrap().winner, Side::Attacker);
        assert_eq!(lost.check_game_over(secs(299)), None);
    }

    #[test]
    fn test_suggestion_is_read_only() {
        let mut s = session(vec![outpost(0, 400, 20, 60), outpost(1, 300, 0, 40)], 500, 0.5);
        s.poll(Duration::ZERO);
        let hash = s.state_hash();
        let memory = s.memory().clone();
        let suggestion = s.suggestion().unwrap();
        assert!(suggestion.score >= 1);
        assert_eq!(s.state_hash(), hash);
        assert_eq!(s.memory(), &memory);
        assert!(s.outpost(suggestion.outpost).is_some());
    }

    #[test]
    fn test_generated_sessions_match_by_seed() {
        let a = Session::generate(ScenarioConfig::default(), 17);
        let b = Session::generate(ScenarioConfig::default(), 17);
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.reserve(), 500);
        assert_eq!(a.phase(), Phase::OpeningWave);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::PlayerTurn.to_string(), "player turn");
        assert_eq!(Phase::AiTurn.to_string(), "AI turn");
    }
}
