//! Stochastic combat resolution.
//!
//! Each resolver call settles one engagement at one outpost:
//! - Alien attacks pit the infestation against the garrison, or against the
//!   civilians when no garrison is left
//! - Player defenses land reinforcements (weakened by distance from the base)
//!   and fight the infestation with a small defense bonus
//! - The opening wave applies a light scripted strike to every contested outpost
//!
//! Win probability comes from a saturating curve over the defender/attacker
//! ratio (see [`combat_strength`]). Every multiplicative loss is truncated to
//! whole units, and every result is clamped to the outpost caps.

use serde::{Deserialize, Serialize};

use crate::outpost::{BaseLocation, Outpost, MAX_ALIENS, MAX_MILITARY, MAX_POPULATION};
use crate::rng::RandomSource;

/// Weight of one soldier in the strength ratio.
pub const MILITARY_STRENGTH: f64 = 1.0;

/// Weight of one civilian in the strength ratio.
pub const CIVILIAN_STRENGTH: f64 = 0.2;

/// Civilians alone repel an attack this much less often than the raw curve says.
pub const CIVILIAN_RESISTANCE_FACTOR: f64 = 0.3;

/// Distance at which reinforcements would arrive with nothing left.
pub const DISTANCE_PENALTY: f64 = 2500.0;

/// Floor on the fraction of reinforcements that arrive.
pub const MIN_DISTANCE_FACTOR: f64 = 0.4;

/// Multiplier on the defender's win probability when reinforcing.
pub const DEFENSE_BONUS: f64 = 1.1;

/// Who stands against the aliens in a strength calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Trained garrison troops.
    Military,
    /// Civilians fighting without a garrison.
    Civilian,
}

impl DefenderKind {
    /// Strength weight of one defender of this kind.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            DefenderKind::Military => MILITARY_STRENGTH,
            DefenderKind::Civilian => CIVILIAN_STRENGTH,
        }
    }
}

/// Result of one resolver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// Nothing to fight (no aliens, or no troops sent). State untouched.
    Skipped,
    /// The defenders drove the aliens out.
    DefendersHeld,
    /// The aliens prevailed.
    AttackersPrevailed,
}

impl CombatOutcome {
    /// Whether the engagement actually took place.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, CombatOutcome::Skipped)
    }
}

/// Saturating win probability for the defenders.
///
/// ```text
/// ratio    = defenders × weight / (attackers + 1)
/// strength = 1 − e^(−ratio)
/// ```
///
/// Zero defenders gives zero strength; the curve approaches 1 as the ratio grows.
#[must_use]
pub fn combat_strength(attackers: u32, defenders: u32, kind: DefenderKind) -> f64 {
    let ratio = f64::from(defenders) * kind.weight() / (f64::from(attackers) + 1.0);
    1.0 - (-ratio).exp()
}

/// Scale a count by a factor, truncating to whole units.
fn scale(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).max(0.0) as u32
}

/// Resolve an alien attack on an outpost.
///
/// With a garrison present, the garrison fights at full weight:
/// - Hold: aliens wiped out, garrison keeps 60-80%, civilians keep 85-95%
/// - Fall: garrison wiped out, aliens keep 50-70%, civilians keep 40-60%
///
/// Without a garrison the civilians resist at reduced odds:
/// - Hold: aliens wiped out, civilians keep 20-40%
/// - Fall: every civilian is lost
///
/// Returns [`CombatOutcome::Skipped`] without touching the outpost when it
/// holds no aliens.
pub fn resolve_alien_attack<R: RandomSource + ?Sized>(
    outpost: &mut Outpost,
    rng: &mut R,
) -> CombatOutcome {
    if outpost.aliens == 0 {
        return CombatOutcome::Skipped;
    }

    outpost.under_attack = true;
    let aliens = outpost.aliens;
    let military = outpost.military;
    let civilians = outpost.population;

    let outcome = if military > 0 {
        let strength = combat_strength(aliens, military, DefenderKind::Military);
        if rng.next_unit() < strength {
            outpost.aliens = 0;
            outpost.military = scale(military, rng.uniform(0.6, 0.8));
            outpost.population = scale(civilians, rng.uniform(0.85, 0.95));
            CombatOutcome::DefendersHeld
        } else {
            outpost.military = 0;
            outpost.aliens = scale(aliens, rng.uniform(0.5, 0.7));
            outpost.population = scale(civilians, rng.uniform(0.4, 0.6));
            CombatOutcome::AttackersPrevailed
        }
    } else {
        let resistance = combat_strength(aliens, civilians, DefenderKind::Civilian);
        if rng.next_unit() < resistance * CIVILIAN_RESISTANCE_FACTOR {
            outpost.aliens = 0;
            outpost.population = scale(civilians, rng.uniform(0.2, 0.4));
            CombatOutcome::DefendersHeld
        } else {
            outpost.population = 0;
            CombatOutcome::AttackersPrevailed
        }
    };

    outpost.update_damage();

    tracing::debug!(
        outpost = %outpost.name,
        ?outcome,
        population = outpost.population,
        military = outpost.military,
        aliens = outpost.aliens,
        damage = outpost.damage,
        "Alien attack resolved"
    );

    outcome
}

/// Fraction of reinforcements that survive the trip from the base.
#[must_use]
pub fn distance_factor(distance: f64) -> f64 {
    (1.0 - distance / DISTANCE_PENALTY).max(MIN_DISTANCE_FACTOR)
}

/// Resolve a player reinforcement against an outpost's infestation.
///
/// ```text
/// effective = min(100, reinforcements × distance_factor)
/// total     = min(100, garrison + effective)
/// P(hold)   = combat_strength(aliens, total) × 1.1
/// ```
///
/// - Hold: aliens wiped out, garrison keeps 70-90% of `total`, civilians
///   recover to 105-115%
/// - Fail: aliens keep 30-50%, garrison keeps 50-70% of `total`, civilians
///   keep 80-90%
///
/// Returns [`CombatOutcome::Skipped`] without touching the outpost when no
/// troops are sent or no aliens are present. Deducting the troops from the
/// base reserve is the caller's job.
pub fn resolve_player_defense<B, R>(
    outpost: &mut Outpost,
    reinforcements: u32,
    base: &B,
    rng: &mut R,
) -> CombatOutcome
where
    B: BaseLocation + ?Sized,
    R: RandomSource + ?Sized,
{
    if reinforcements == 0 || outpost.aliens == 0 {
        return CombatOutcome::Skipped;
    }

    let distance = outpost.position.distance_to(base.position());
    let effective = scale(reinforcements, distance_factor(distance)).min(MAX_MILITARY);
    let total_military = outpost.military.saturating_add(effective).min(MAX_MILITARY);

    let strength = combat_strength(outpost.aliens, total_military, DefenderKind::Military);

    let outcome = if rng.next_unit() < strength * DEFENSE_BONUS {
        outpost.aliens = 0;
        outpost.military = scale(total_military, rng.uniform(0.7, 0.9)).min(MAX_MILITARY);
        outpost.population =
            scale(outpost.population, rng.uniform(1.05, 1.15)).min(MAX_POPULATION);
        CombatOutcome::DefendersHeld
    } else {
        outpost.aliens = scale(outpost.aliens, rng.uniform(0.3, 0.5)).min(MAX_ALIENS);
        outpost.military = scale(total_military, rng.uniform(0.5, 0.7)).min(MAX_MILITARY);
        outpost.population =
            scale(outpost.population, rng.uniform(0.8, 0.9)).min(MAX_POPULATION);
        CombatOutcome::AttackersPrevailed
    };

    outpost.update_damage();

    tracing::debug!(
        outpost = %outpost.name,
        reinforcements,
        effective,
        ?outcome,
        population = outpost.population,
        military = outpost.military,
        aliens = outpost.aliens,
        "Player defense resolved"
    );

    outcome
}

/// Light scripted strike used by the opening wave.
///
/// The outpost loses 10-15% of its civilians, damage is recomputed, then a
/// flat 1-3 civilians are lost on top. With `rebaseline` set the damage
/// baseline is moved to the surviving population afterwards, so later damage
/// is measured from here rather than from the starting population.
///
/// Returns `false` without touching the outpost unless it holds both civilians
/// and aliens.
pub fn resolve_opening_strike<R: RandomSource + ?Sized>(
    outpost: &mut Outpost,
    rng: &mut R,
    rebaseline: bool,
) -> bool {
    if !outpost.is_contested() {
        return false;
    }

    let lost = scale(outpost.population, rng.uniform(0.1, 0.15));
    outpost.population -= lost;
    outpost.update_damage();

    let hit = rng.range_inclusive(1, 3);
    outpost.population = outpost.population.saturating_sub(hit);
    outpost.under_attack = true;

    if rebaseline {
        outpost.rebaseline();
    } else {
        outpost.update_damage();
    }

    true
}
