//! Test fixtures and helpers.
//!
//! Pre-built outposts, bases and random sources for consistent testing.

use std::collections::VecDeque;

use outpost_core::outpost::{Base, Outpost, OutpostId, Position};
use outpost_core::rng::RandomSource;
use outpost_core::session::Session;
use outpost_core::setup::ScenarioConfig;

/// Base position used by every fixture.
pub const FIXTURE_BASE: Position = Position::new(0.0, 0.0);

/// Base at [`FIXTURE_BASE`] holding `troops`.
#[must_use]
pub const fn base(troops: u32) -> Base {
    Base::new(FIXTURE_BASE, troops)
}

/// Outpost `id` placed on a row 150 units apart, measured from [`FIXTURE_BASE`].
#[must_use]
pub fn outpost(id: u32, population: u32, military: u32, aliens: u32) -> Outpost {
    OutpostBuilder::new(id)
        .population(population)
        .military(military)
        .aliens(aliens)
        .build()
}

/// Fluent builder for a single outpost.
#[derive(Debug, Clone)]
pub struct OutpostBuilder {
    id: u32,
    name: Option<String>,
    position: Position,
    population: u32,
    military: u32,
    aliens: u32,
}

impl OutpostBuilder {
    /// Start an empty outpost with the given id.
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            position: Position::new(200.0 + 150.0 * f64::from(id), 100.0),
            population: 0,
            military: 0,
            aliens: 0,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Place the outpost.
    #[must_use]
    pub const fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set civilians.
    #[must_use]
    pub const fn population(mut self, population: u32) -> Self {
        self.population = population;
        self
    }

    /// Set the garrison.
    #[must_use]
    pub const fn military(mut self, military: u32) -> Self {
        self.military = military;
        self
    }

    /// Set the infestation.
    #[must_use]
    pub const fn aliens(mut self, aliens: u32) -> Self {
        self.aliens = aliens;
        self
    }

    /// Build against [`FIXTURE_BASE`].
    #[must_use]
    pub fn build(self) -> Outpost {
        let name = self
            .name
            .unwrap_or_else(|| format!("Outpost {}", self.id));
        Outpost::new(
            OutpostId(self.id),
            name,
            self.position,
            self.population,
            self.military,
            self.aliens,
            &FIXTURE_BASE,
        )
    }
}

/// A small mixed field: two heavy infestations, one stray, one clear outpost.
#[must_use]
pub fn contested_field() -> Vec<Outpost> {
    vec![
        outpost(0, 400, 30, 60),
        outpost(1, 250, 0, 55),
        outpost(2, 480, 45, 3),
        outpost(3, 300, 10, 0),
    ]
}

/// Six outposts, all contested. Enough branching for pruning to matter.
#[must_use]
pub fn crowded_field() -> Vec<Outpost> {
    vec![
        outpost(0, 400, 30, 60),
        outpost(1, 250, 0, 55),
        outpost(2, 480, 45, 30),
        outpost(3, 300, 10, 20),
        outpost(4, 350, 20, 45),
        outpost(5, 220, 5, 65),
    ]
}

/// Session over the given outposts with the default scenario settings.
#[must_use]
pub fn session_with<R: RandomSource>(outposts: Vec<Outpost>, troops: u32, rng: R) -> Session<R> {
    Session::new(ScenarioConfig::default(), outposts, base(troops), rng)
}

/// Replays a fixed list of unit draws, then repeats a fallback value.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    /// Replay `draws`, then keep returning the last of them (or 0.5 if empty).
    #[must_use]
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            fallback: draws.last().copied().unwrap_or(0.5),
        }
    }

    /// Always return `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(&[value])
    }

    /// Draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRng {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let o = OutpostBuilder::new(2).population(100).aliens(5).build();
        assert_eq!(o.id, OutpostId(2));
        assert_eq!(o.name, "Outpost 2");
        assert_eq!(o.population, 100);
        assert_eq!(o.military, 0);
        assert!(o.distance_from_base > 0.0);
    }

    #[test]
    fn test_scripted_rng_replays_then_repeats() {
        let mut rng = ScriptedRng::new(&[0.1, 0.9]);
        assert!((rng.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.9).abs() < f64::EPSILON);
        assert_eq!(rng.remaining(), 0);
        assert!((rng.next_unit() - 0.9).abs() < f64::EPSILON);
    }
}
