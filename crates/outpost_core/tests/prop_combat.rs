//! Property-based tests for combat resolution.
//!
//! Every resolver call must leave every resource inside its cap, whatever the
//! starting state and whatever the draws.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use outpost_core::combat::{
    resolve_alien_attack, resolve_opening_strike, resolve_player_defense, CombatOutcome,
};
use outpost_core::outpost::{Outpost, MAX_ALIENS, MAX_DAMAGE, MAX_MILITARY, MAX_POPULATION};
use outpost_core::rng::GameRng;
use outpost_test_utils::determinism::strategies::{arb_contested_outpost, arb_outpost};
use outpost_test_utils::fixtures::{outpost, FIXTURE_BASE};
use proptest::prelude::*;

fn assert_in_bounds(o: &Outpost) -> Result<(), TestCaseError> {
    prop_assert!(o.population <= MAX_POPULATION);
    prop_assert!(o.military <= MAX_MILITARY);
    prop_assert!(o.aliens <= MAX_ALIENS);
    prop_assert!(o.damage <= MAX_DAMAGE);
    Ok(())
}

#[test]
fn test_undefended_outpost_loses_everyone_or_keeps_few() {
    for seed in 0..200 {
        let mut o = outpost(0, 500, 0, 50);
        let mut rng = GameRng::seeded(seed);
        match resolve_alien_attack(&mut o, &mut rng) {
            CombatOutcome::DefendersHeld => {
                assert_eq!(o.aliens, 0);
                assert!((100..=200).contains(&o.population));
                assert!((60..=80).contains(&o.damage));
            }
            CombatOutcome::AttackersPrevailed => {
                assert_eq!(o.population, 0);
                assert_eq!(o.damage, 100);
            }
            CombatOutcome::Skipped => panic!("aliens were present"),
        }
    }
}

#[test]
fn test_stronger_garrisons_hold_more_often() {
    let holds = |military: u32| {
        (0..400)
            .filter(|&seed| {
                let mut o = outpost(0, 400, military, 60);
                let mut rng = GameRng::seeded(seed);
                resolve_alien_attack(&mut o, &mut rng) == CombatOutcome::DefendersHeld
            })
            .count()
    };
    assert!(holds(90) > holds(10));
}

#[test]
fn test_zero_reinforcements_change_nothing() {
    let mut o = outpost(0, 400, 20, 60);
    let before = o.clone();
    let mut rng = GameRng::seeded(1);
    let outcome = resolve_player_defense(&mut o, 0, &FIXTURE_BASE, &mut rng);
    assert_eq!(outcome, CombatOutcome::Skipped);
    assert_eq!(o, before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_alien_attack_bounded(o in arb_outpost(0), seed in any::<u64>()) {
        let mut o = o;
        let before_population = o.population;
        let outcome = resolve_alien_attack(&mut o, &mut GameRng::seeded(seed));
        assert_in_bounds(&o)?;
        prop_assert!(o.population <= before_population);
        if outcome.is_resolved() {
            prop_assert!(o.under_attack);
        }
    }

    #[test]
    fn prop_player_defense_bounded(
        o in arb_outpost(0),
        troops in 0u32..=500,
        seed in any::<u64>(),
    ) {
        let mut o = o;
        let before_aliens = o.aliens;
        resolve_player_defense(&mut o, troops, &FIXTURE_BASE, &mut GameRng::seeded(seed));
        assert_in_bounds(&o)?;
        prop_assert!(o.aliens <= before_aliens);
    }

    #[test]
    fn prop_opening_strike_bounded(
        o in arb_contested_outpost(0),
        seed in any::<u64>(),
        rebaseline in any::<bool>(),
    ) {
        let mut o = o;
        let before_population = o.population;
        prop_assert!(resolve_opening_strike(&mut o, &mut GameRng::seeded(seed), rebaseline));
        assert_in_bounds(&o)?;
        prop_assert!(o.population < before_population || o.population == 0);
        if rebaseline {
            prop_assert_eq!(o.original_population, o.population);
        }
    }

    #[test]
    fn prop_update_damage_idempotent(o in arb_outpost(0), lost in 0u32..=1000) {
        let mut o = o;
        o.population = o.population.saturating_sub(lost);
        o.update_damage();
        let once = o.damage;
        o.update_damage();
        prop_assert_eq!(o.damage, once);
        prop_assert!(o.damage <= MAX_DAMAGE);
    }
}
