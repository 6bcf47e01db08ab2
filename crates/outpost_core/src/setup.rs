//! Scenario configuration and randomized outpost generation.
//!
//! A [`ScenarioConfig`] carries every tunable of a game: arena layout, the
//! base, how outposts are seeded, and turn timing. The defaults reproduce the
//! reference game; RON files may override any subset of fields.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::memory::MAX_AI_MEMORY;
use crate::outpost::{BaseLocation, Outpost, OutpostId, Position};
use crate::rng::RandomSource;
use crate::search::{DepthPolicy, DEFAULT_SEARCH_DEPTH};

/// Most outposts a scenario may hold (one per letter).
pub const MAX_OUTPOSTS: u32 = 26;

/// Longest game length or AI delay a scenario may ask for: one day.
pub const MAX_TIMER_SECS: f64 = 86_400.0;

/// Axis-aligned rectangle in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Zone {
    /// Create a zone.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the two rectangles share interior area. Touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// Everything needed to set up and run one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Scenario name.
    pub name: String,
    /// Arena size (width, height).
    pub arena: (u32, u32),
    /// Where reinforcements start from.
    pub base_position: Position,
    /// Starting troop reserve.
    pub base_troops: u32,
    /// Inclusive range for the number of outposts.
    pub outpost_count: (u32, u32),
    /// Minimum distance between two outposts.
    pub placement_margin: f64,
    /// Placement tries before giving up on the remaining outposts.
    pub placement_attempts: u32,
    /// Side length of the square an outpost occupies.
    pub outpost_footprint: f64,
    /// Areas no outpost footprint may overlap.
    pub forbidden_zones: Vec<Zone>,
    /// Inclusive range for outpost x coordinates.
    pub x_range: (u32, u32),
    /// Inclusive range for outpost y coordinates.
    pub y_range: (u32, u32),
    /// Inclusive range for starting civilians.
    pub population: (u32, u32),
    /// Chance an outpost starts with a real garrison.
    pub garrison_chance: f64,
    /// Garrison range when garrisoned.
    pub garrisoned_military: (u32, u32),
    /// Garrison range otherwise.
    pub token_military: (u32, u32),
    /// Chance an outpost starts heavily infested.
    pub infestation_chance: f64,
    /// Alien range when infested.
    pub infested_aliens: (u32, u32),
    /// Alien range otherwise.
    pub stray_aliens: (u32, u32),
    /// Game length in seconds.
    pub duration_secs: f64,
    /// Search depth for the attacker's turn.
    pub ai_depth: DepthPolicy,
    /// Search depth for the player's suggestion.
    pub advisor_depth: u32,
    /// Pause between the player's move and the attacker's reply, in seconds.
    pub ai_delay_secs: f64,
    /// Number of recent attacker targets remembered.
    pub memory_capacity: usize,
    /// Move each outpost's damage baseline after the opening wave.
    pub rebaseline_after_opening_wave: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "Standard Defense".to_string(),
            arena: (1200, 700),
            base_position: Position::new(985.0, 20.0),
            base_troops: 500,
            outpost_count: (6, 9),
            placement_margin: 180.0,
            placement_attempts: 500,
            outpost_footprint: 150.0,
            forbidden_zones: vec![
                Zone::new(20.0, 150.0, 180.0, 300.0),
                Zone::new(985.0, 20.0, 200.0, 200.0),
            ],
            x_range: (100, 1000),
            y_range: (50, 500),
            population: (200, 500),
            garrison_chance: 0.7,
            garrisoned_military: (10, 50),
            token_military: (0, 10),
            infestation_chance: 0.7,
            infested_aliens: (50, 70),
            stray_aliens: (0, 5),
            duration_secs: 300.0,
            ai_depth: DepthPolicy::Fixed(DEFAULT_SEARCH_DEPTH),
            advisor_depth: DEFAULT_SEARCH_DEPTH,
            ai_delay_secs: 1.0,
            memory_capacity: MAX_AI_MEMORY,
            rebaseline_after_opening_wave: true,
        }
    }
}

impl ScenarioConfig {
    /// Load and validate a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigLoad {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Parse and validate a scenario from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: ScenarioConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the scenario can be played.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("outpost_count", self.outpost_count),
            ("x_range", self.x_range),
            ("y_range", self.y_range),
            ("population", self.population),
            ("garrisoned_military", self.garrisoned_military),
            ("token_military", self.token_military),
            ("infested_aliens", self.infested_aliens),
            ("stray_aliens", self.stray_aliens),
        ];
        for (field, (lo, hi)) in ranges {
            if lo > hi {
                return Err(GameError::InvalidConfig(format!(
                    "{field}: lower bound {lo} exceeds upper bound {hi}"
                )));
            }
        }

        if self.outpost_count.1 > MAX_OUTPOSTS {
            return Err(GameError::InvalidConfig(format!(
                "outpost_count: at most {MAX_OUTPOSTS} outposts are supported"
            )));
        }

        for (field, chance) in [
            ("garrison_chance", self.garrison_chance),
            ("infestation_chance", self.infestation_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(GameError::InvalidConfig(format!(
                    "{field}: {chance} is not a probability"
                )));
            }
        }

        if !(self.duration_secs > 0.0 && self.duration_secs <= MAX_TIMER_SECS) {
            return Err(GameError::InvalidConfig(format!(
                "duration_secs: {} is outside (0, {MAX_TIMER_SECS}]",
                self.duration_secs
            )));
        }
        if !(self.ai_delay_secs >= 0.0 && self.ai_delay_secs <= MAX_TIMER_SECS) {
            return Err(GameError::InvalidConfig(format!(
                "ai_delay_secs: {} is outside [0, {MAX_TIMER_SECS}]",
                self.ai_delay_secs
            )));
        }

        Ok(())
    }

    /// Game length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        timer(self.duration_secs)
    }

    /// Pause before the attacker replies to a player move.
    #[must_use]
    pub fn ai_delay(&self) -> Duration {
        timer(self.ai_delay_secs)
    }
}

/// Seconds to a `Duration`, clamped to `[0, MAX_TIMER_SECS]`. NaN reads as zero.
fn timer(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_TIMER_SECS)).unwrap_or(Duration::ZERO)
}

/// Place up to `count` outposts.
///
/// Candidates are drawn uniformly from the configured ranges and rejected when
/// closer than the placement margin to an earlier outpost or when their
/// footprint overlaps a forbidden zone. Placement stops after the configured
/// number of attempts, so fewer than `count` positions may come back.
pub fn generate_positions<R: RandomSource + ?Sized>(
    config: &ScenarioConfig,
    count: usize,
    rng: &mut R,
) -> Vec<Position> {
    let mut positions: Vec<Position> = Vec::with_capacity(count);
    let mut attempts = config.placement_attempts;

    while positions.len() < count && attempts > 0 {
        let x = f64::from(rng.range_inclusive(config.x_range.0, config.x_range.1));
        let y = f64::from(rng.range_inclusive(config.y_range.0, config.y_range.1));
        let candidate = Position::new(x, y);
        let footprint = Zone::new(x, y, config.outpost_footprint, config.outpost_footprint);

        let too_close = positions
            .iter()
            .any(|p| p.distance_to(candidate) < config.placement_margin);
        let blocked = config.forbidden_zones.iter().any(|z| footprint.overlaps(z));

        if !too_close && !blocked {
            positions.push(candidate);
        }
        attempts -= 1;
    }

    if positions.len() < count {
        tracing::warn!(
            requested = count,
            placed = positions.len(),
            "Ran out of placement attempts"
        );
    }

    positions
}

fn outpost_name(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    format!("Outpost {letter}")
}

/// Roll a fresh set of outposts around `base`.
///
/// Outposts are named "Outpost A", "Outpost B", ... in placement order.
pub fn generate_outposts<B, R>(config: &ScenarioConfig, base: &B, rng: &mut R) -> Vec<Outpost>
where
    B: BaseLocation + ?Sized,
    R: RandomSource + ?Sized,
{
    let count = rng.range_inclusive(config.outpost_count.0, config.outpost_count.1) as usize;
    let positions = generate_positions(config, count, rng);

    let outposts: Vec<Outpost> = positions
        .into_iter()
        .enumerate()
        .map(|(index, position)| {
            let population = rng.range_inclusive(config.population.0, config.population.1);
            let military = if rng.next_unit() < config.garrison_chance {
                rng.range_inclusive(config.garrisoned_military.0, config.garrisoned_military.1)
            } else {
                rng.range_inclusive(config.token_military.0, config.token_military.1)
            };
            let aliens = if rng.next_unit() < config.infestation_chance {
                rng.range_inclusive(config.infested_aliens.0, config.infested_aliens.1)
            } else {
                rng.range_inclusive(config.stray_aliens.0, config.stray_aliens.1)
            };

            Outpost::new(
                OutpostId(index as u32),
                outpost_name(index),
                position,
                population,
                military,
                aliens,
                base,
            )
        })
        .collect();

    tracing::debug!(
        scenario = %config.name,
        outposts = outposts.len(),
        "Generated outposts"
    );

    outposts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::GameRng;

    #[test]
    fn test_zone_overlap() {
        let zone = Zone::new(0.0, 0.0, 100.0, 100.0);
        assert!(zone.overlaps(&Zone::new(50.0, 50.0, 100.0, 100.0)));
        assert!(!zone.overlaps(&Zone::new(100.0, 0.0, 50.0, 50.0)));
        assert!(!zone.overlaps(&Zone::new(300.0, 300.0, 10.0, 10.0)));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
        assert_eq!(ScenarioConfig::default().duration(), Duration::from_secs(300));
        assert_eq!(ScenarioConfig::default().ai_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = ScenarioConfig::from_ron_str(
            r#"(
                name: "Short",
                base_troops: 120,
                duration_secs: 60.0,
                ai_depth: ScaledByCount,
            )"#,
        )
        .unwrap();
        assert_eq!(config.name, "Short");
        assert_eq!(config.base_troops, 120);
        assert_eq!(config.ai_depth, DepthPolicy::ScaledByCount);
        assert_eq!(config.outpost_count, (6, 9));
        assert!(config.rebaseline_after_opening_wave);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = ScenarioConfig::from_ron_str("(population: (500, 200))").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = ScenarioConfig {
            garrison_chance: 1.5,
            ..ScenarioConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_timers() {
        for ron in [
            "(duration_secs: 1e20)",
            "(ai_delay_secs: 1e20)",
            "(duration_secs: 86401.0)",
        ] {
            let err = ScenarioConfig::from_ron_str(ron).unwrap_err();
            assert!(matches!(err, GameError::InvalidConfig(_)), "{ron}");
        }
        assert!(ScenarioConfig::from_ron_str("(duration_secs: 86400.0)").is_ok());
    }

    #[test]
    fn test_timers_saturate_when_unvalidated() {
        let config = ScenarioConfig {
            duration_secs: 1e20,
            ai_delay_secs: f64::NAN,
            ..ScenarioConfig::default()
        };
        assert_eq!(config.duration(), Duration::from_secs(86_400));
        assert_eq!(config.ai_delay(), Duration::ZERO);
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let err = ScenarioConfig::from_ron_str("(base_troops: \"many\")").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ScenarioConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, GameError::ConfigLoad { .. }));
    }

    #[test]
    fn test_positions_respect_margin_and_zones() {
        let config = ScenarioConfig::default();
        for seed in 0..20 {
            let mut rng = GameRng::seeded(seed);
            let positions = generate_positions(&config, 9, &mut rng);
            assert!(positions.len() <= 9);
            for (i, a) in positions.iter().enumerate() {
                assert!((100.0..=1000.0).contains(&a.x));
                assert!((50.0..=500.0).contains(&a.y));
                let footprint = Zone::new(a.x, a.y, 150.0, 150.0);
                assert!(config.forbidden_zones.iter().all(|z| !footprint.overlaps(z)));
                for b in &positions[i + 1..] {
                    assert!(a.distance_to(*b) >= 180.0);
                }
            }
        }
    }

    #[test]
    fn test_generated_outposts_within_ranges() {
        let config = ScenarioConfig::default();
        let mut rng = GameRng::seeded(42);
        let outposts = generate_outposts(&config, &config.base_position, &mut rng);
        assert!(!outposts.is_empty());
        assert!(outposts.len() <= 9);
        for (i, o) in outposts.iter().enumerate() {
            assert_eq!(o.id, OutpostId(i as u32));
            assert!((200..=500).contains(&o.population));
            assert!(o.military <= 50);
            assert!(o.aliens <= 70);
            assert_eq!(o.damage, 0);
            assert_eq!(o.original_population, o.population);
            assert!(o.distance_from_base > 0.0);
        }
        assert_eq!(outposts[0].name, "Outpost A");
    }

    #[test]
    fn test_generation_is_seeded() {
        let config = ScenarioConfig::default();
        let a = generate_outposts(&config, &config.base_position, &mut GameRng::seeded(9));
        let b = generate_outposts(&config, &config.base_position, &mut GameRng::seeded(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_exhausted_attempts_return_fewer() {
        let config = ScenarioConfig {
            placement_attempts: 0,
            ..ScenarioConfig::default()
        };
        let mut rng = GameRng::seeded(1);
        assert!(generate_positions(&config, 6, &mut rng).is_empty());
    }
}
