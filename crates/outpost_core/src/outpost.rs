//! Outpost entity model.
//!
//! An outpost is a contested location holding three populations: civilians,
//! a military garrison and an alien infestation. Outposts are created once at
//! setup and never destroyed; a fully depleted outpost simply sits at zero.
//!
//! Damage is derived state. It is recomputed from civilian losses relative to
//! [`Outpost::original_population`] and is never set independently outside the
//! search engine's temporary proxy mutations, which are undone through
//! [`Snapshot`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Soft cap on civilian population.
pub const MAX_POPULATION: u32 = 1000;

/// Hard cap on the military garrison.
pub const MAX_MILITARY: u32 = 100;

/// Hard cap on the alien infestation.
pub const MAX_ALIENS: u32 = 200;

/// Damage is a percentage.
pub const MAX_DAMAGE: u32 = 100;

/// A fixed point on the playing field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Anything with a fixed location the defender ships troops from.
///
/// Combat and scoring only ever need the position, so callers can pass a bare
/// [`Position`] where no troop reserve is involved.
pub trait BaseLocation {
    /// Location of the base.
    fn position(&self) -> Position;
}

impl BaseLocation for Position {
    fn position(&self) -> Position {
        *self
    }
}

/// The defender's home base and its troop reserve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Base {
    /// Location of the base.
    pub position: Position,
    /// Troops still available for reinforcement.
    pub troops: u32,
}

impl Base {
    /// Create a base with a full reserve.
    #[must_use]
    pub const fn new(position: Position, troops: u32) -> Self {
        Self { position, troops }
    }

    /// Remove troops from the reserve, flooring at zero.
    pub fn withdraw(&mut self, troops: u32) {
        self.troops = self.troops.saturating_sub(troops);
    }

    /// Whether the reserve is exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.troops == 0
    }
}

impl BaseLocation for Base {
    fn position(&self) -> Position {
        self.position
    }
}

/// Stable identifier for an outpost within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutpostId(pub u32);

impl fmt::Display for OutpostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A contested outpost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outpost {
    /// Identifier, unique within a session.
    pub id: OutpostId,
    /// Display name.
    pub name: String,
    /// Fixed location.
    pub position: Position,
    /// Civilian count (0..=1000).
    pub population: u32,
    /// Defensive garrison (0..=100).
    pub military: u32,
    /// Attacking aliens present (0..=200).
    pub aliens: u32,
    /// Percent of the original population lost (0..=100).
    pub damage: u32,
    /// Population baseline used for damage.
    pub original_population: u32,
    /// Set when the outpost was hit during the current cycle.
    pub under_attack: bool,
    /// Distance to the base, cached at creation.
    pub distance_from_base: f64,
}

impl Outpost {
    /// Create an outpost, clamping every resource to its cap.
    #[must_use]
    pub fn new<B: BaseLocation + ?Sized>(
        id: OutpostId,
        name: impl Into<String>,
        position: Position,
        population: u32,
        military: u32,
        aliens: u32,
        base: &B,
    ) -> Self {
        let population = population.min(MAX_POPULATION);
        let mut outpost = Self {
            id,
            name: name.into(),
            position,
            population,
            military: military.min(MAX_MILITARY),
            aliens: aliens.min(MAX_ALIENS),
            damage: 0,
            original_population: population,
            under_attack: false,
            distance_from_base: position.distance_to(base.position()).max(0.0),
        };
        outpost.update_damage();
        outpost
    }

    /// Recompute [`damage`](Self::damage) from population lost since the baseline.
    ///
    /// Idempotent: calling it twice without touching the population changes nothing.
    pub fn update_damage(&mut self) {
        if self.original_population == 0 {
            self.damage = 0;
            return;
        }
        let lost = i64::from(self.original_population) - i64::from(self.population);
        let percent = lost * 100 / i64::from(self.original_population);
        self.damage = percent.clamp(0, i64::from(MAX_DAMAGE)) as u32;
    }

    /// Reset the damage baseline to the current population.
    ///
    /// Used by the opening wave when it reproduces the reference rebaselining.
    /// Damage is left as computed before the reset.
    pub fn rebaseline(&mut self) {
        self.original_population = self.population;
    }

    /// Whether civilians remain.
    #[must_use]
    pub const fn is_populated(&self) -> bool {
        self.population > 0
    }

    /// Whether aliens occupy the outpost.
    #[must_use]
    pub const fn is_infested(&self) -> bool {
        self.aliens > 0
    }

    /// Whether an attacker can still strike here (civilians and aliens both present).
    #[must_use]
    pub const fn is_contested(&self) -> bool {
        self.is_populated() && self.is_infested()
    }
}

/// Resource fields of one outpost, captured before a search trial.
///
/// Restoring a snapshot puts the outpost back exactly as it was, which keeps
/// sibling branches of the search from ever seeing each other's mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot {
    /// Aliens at capture time.
    pub aliens: u32,
    /// Garrison at capture time.
    pub military: u32,
    /// Population at capture time.
    pub population: u32,
    /// Damage at capture time.
    pub damage: u32,
}

impl Snapshot {
    /// Capture the mutable resource fields of an outpost.
    #[must_use]
    pub const fn capture(outpost: &Outpost) -> Self {
        Self {
            aliens: outpost.aliens,
            military: outpost.military,
            population: outpost.population,
            damage: outpost.damage,
        }
    }

    /// Write the captured fields back.
    pub fn restore(self, outpost: &mut Outpost) {
        outpost.aliens = self.aliens;
        outpost.military = self.military;
        outpost.population = self.population;
        outpost.damage = self.damage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outpost(population: u32, military: u32, aliens: u32) -> Outpost {
        Outpost::new(
            OutpostId(0),
            "Test",
            Position::new(0.0, 0.0),
            population,
            military,
            aliens,
            &Position::new(300.0, 400.0),
        )
    }

    #[test]
    fn test_new_clamps_resources() {
        let o = outpost(5000, 500, 900);
        assert_eq!(o.population, MAX_POPULATION);
        assert_eq!(o.military, MAX_MILITARY);
        assert_eq!(o.aliens, MAX_ALIENS);
        assert_eq!(o.original_population, MAX_POPULATION);
        assert_eq!(o.damage, 0);
    }

    #[test]
    fn test_distance_from_base_cached() {
        let o = outpost(100, 0, 0);
        assert!((o.distance_from_base - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_damage_truncates() {
        let mut o = outpost(300, 0, 0);
        o.population = 200;
        o.update_damage();
        // 100 / 300 = 33.3%
        assert_eq!(o.damage, 33);
    }

    #[test]
    fn test_update_damage_clamps_recovery() {
        let mut o = outpost(300, 0, 0);
        o.population = 330;
        o.update_damage();
        assert_eq!(o.damage, 0);
    }

    #[test]
    fn test_update_damage_total_loss() {
        let mut o = outpost(300, 0, 0);
        o.population = 0;
        o.update_damage();
        assert_eq!(o.damage, 100);
    }

    #[test]
    fn test_update_damage_zero_baseline() {
        let mut o = outpost(0, 0, 0);
        o.update_damage();
        assert_eq!(o.damage, 0);
    }

    #[test]
    fn test_update_damage_idempotent() {
        let mut o = outpost(420, 10, 10);
        o.population = 111;
        o.update_damage();
        let first = o.damage;
        o.update_damage();
        assert_eq!(o.damage, first);
    }

    #[test]
    fn test_rebaseline_resets_future_damage() {
        let mut o = outpost(400, 0, 0);
        o.population = 300;
        o.update_damage();
        assert_eq!(o.damage, 25);
        o.rebaseline();
        assert_eq!(o.damage, 25);
        o.update_damage();
        assert_eq!(o.damage, 0);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut o = outpost(400, 40, 60);
        let snap = Snapshot::capture(&o);
        o.aliens = 1;
        o.military = 2;
        o.population = 3;
        o.damage = 99;
        snap.restore(&mut o);
        assert_eq!(Snapshot::capture(&o), snap);
    }

    #[test]
    fn test_base_withdraw_floors_at_zero() {
        let mut base = Base::new(Position::new(985.0, 20.0), 50);
        base.withdraw(30);
        assert_eq!(base.troops, 20);
        base.withdraw(100);
        assert_eq!(base.troops, 0);
        assert!(base.is_depleted());
    }

    #[test]
    fn test_contested() {
        assert!(outpost(10, 0, 5).is_contested());
        assert!(!outpost(0, 0, 5).is_contested());
        assert!(!outpost(10, 0, 0).is_contested());
    }
}
