//! Per-outpost priority scoring.
//!
//! The same outpost is scored differently for each side:
//!
//! ```text
//! defender = pop/800 × 5.0 + aliens × 3.0 + damage × 1.5 − military × 0.3
//!            − distance × 2.0 − (30 if recently hit)
//! attacker = pop/600 × 5.0 − military × 2.5 + aliens × 2.0 − damage × 0.8
//!            − distance × 1.5 + (20 if recently hit)
//! ```
//!
//! `distance` is the base distance over 1500, clamped to `[0, 1]`. The recency
//! terms pull in opposite directions: the attacker keeps pressing outposts it
//! just hit while the defender is steered towards the ones it has not.

use serde::{Deserialize, Serialize};

use crate::memory::AttackMemory;
use crate::outpost::{BaseLocation, Outpost};

/// Distance at which the distance penalty saturates.
pub const DISTANCE_NORMALIZER: f64 = 1500.0;

/// Scores never drop below this.
pub const MIN_SCORE: i64 = 1;

/// Which side a score or search ply is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perspective {
    /// The player, who reinforces outposts. Maximizing in search.
    Defender,
    /// The AI, which chooses attack targets. Minimizing in search.
    Attacker,
}

impl Perspective {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Perspective::Defender => Perspective::Attacker,
            Perspective::Attacker => Perspective::Defender,
        }
    }

    /// Whether this side maximizes in search.
    #[must_use]
    pub const fn is_maximizing(self) -> bool {
        matches!(self, Perspective::Defender)
    }
}

/// Normalized distance penalty in `[0, 1]`.
///
/// Uses the distance cached on the outpost, falling back to the live distance
/// to `base` when the cache is zero.
#[must_use]
pub fn distance_penalty<B: BaseLocation + ?Sized>(outpost: &Outpost, base: &B) -> f64 {
    let distance = if outpost.distance_from_base == 0.0 {
        outpost.position.distance_to(base.position())
    } else {
        outpost.distance_from_base
    };
    (distance / DISTANCE_NORMALIZER).clamp(0.0, 1.0)
}

/// Unrounded score for one outpost.
#[must_use]
pub fn raw_score<B: BaseLocation + ?Sized>(
    outpost: &Outpost,
    perspective: Perspective,
    base: &B,
    memory: &AttackMemory,
) -> f64 {
    let population = f64::from(outpost.population);
    let military = f64::from(outpost.military);
    let aliens = f64::from(outpost.aliens);
    let damage = f64::from(outpost.damage);
    let penalty = distance_penalty(outpost, base);
    let recent = memory.contains(outpost.id);

    match perspective {
        Perspective::Defender => {
            population / 800.0 * 5.0 + aliens * 3.0 + damage * 1.5
                - military * 0.3
                - penalty * 2.0
                - if recent { 30.0 } else { 0.0 }
        }
        Perspective::Attacker => {
            population / 600.0 * 5.0 - military * 2.5 + aliens * 2.0
                - damage * 0.8
                - penalty * 1.5
                + if recent { 20.0 } else { 0.0 }
        }
    }
}

/// Integer priority of an outpost for one side, never below [`MIN_SCORE`].
///
/// Halves round to the nearest even integer.
#[must_use]
pub fn evaluate<B: BaseLocation + ?Sized>(
    outpost: &Outpost,
    perspective: Perspective,
    base: &B,
    memory: &AttackMemory,
) -> i64 {
    let rounded = raw_score(outpost, perspective, base, memory).round_ties_even();
    (rounded as i64).max(MIN_SCORE)
}
