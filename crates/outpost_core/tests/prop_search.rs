//! Property-based tests for the adversarial search.
//!
//! Run with: cargo test -p outpost_core --test prop_search

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use outpost_core::heuristic::{evaluate, Perspective};
use outpost_core::memory::AttackMemory;
use outpost_core::outpost::{Outpost, OutpostId, Snapshot};
use outpost_core::search::{
    candidates, decide, minimax, simulate_proxy, suggest_defense, terminal_value, DepthPolicy,
    SearchOutcome,
};
use outpost_test_utils::determinism::strategies::{arb_field, arb_memory, arb_perspective};
use outpost_test_utils::fixtures::{contested_field, crowded_field, FIXTURE_BASE};
use proptest::prelude::*;

/// Minimax without pruning, used as the reference for alpha-beta.
fn plain_minimax(
    outposts: &mut [Outpost],
    depth: u32,
    perspective: Perspective,
    memory: &AttackMemory,
) -> SearchOutcome {
    if let Some(value) = terminal_value(outposts, perspective) {
        return SearchOutcome {
            target: None,
            value,
        };
    }

    if depth == 0 {
        let mut best: Option<(OutpostId, i64)> = None;
        for o in outposts.iter().filter(|o| match perspective {
            Perspective::Defender => o.population > 0,
            Perspective::Attacker => o.population > 0 && o.aliens > 0,
        }) {
            let score = evaluate(o, perspective, &FIXTURE_BASE, memory);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((o.id, score));
            }
        }
        return best.map_or(SearchOutcome::regroup(), |(id, score)| SearchOutcome {
            target: Some(id),
            value: score as f64,
        });
    }

    let picks = candidates(outposts, perspective);
    if picks.is_empty() {
        return SearchOutcome::regroup();
    }

    let maximizing = perspective == Perspective::Defender;
    let mut best = SearchOutcome {
        target: None,
        value: if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        },
    };

    for index in picks {
        let mut trial = outposts.to_vec();
        simulate_proxy(&mut trial[index], perspective);
        let child = plain_minimax(&mut trial, depth - 1, perspective.opponent(), memory);
        let better = if maximizing {
            child.value > best.value
        } else {
            child.value < best.value
        };
        if better {
            best = SearchOutcome {
                target: Some(outposts[index].id),
                value: child.value,
            };
        }
    }

    best
}

fn snapshots(outposts: &[Outpost]) -> Vec<Snapshot> {
    outposts.iter().map(Snapshot::capture).collect()
}

#[test]
fn test_alpha_beta_matches_plain_minimax_on_fixed_fields() {
    let memory = AttackMemory::new();
    for field in [contested_field(), crowded_field()] {
        for perspective in [Perspective::Defender, Perspective::Attacker] {
            for depth in 0..=4 {
                let mut outposts = field.clone();
                let pruned = minimax(
                    &mut outposts,
                    depth,
                    perspective,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                    &FIXTURE_BASE,
                    &memory,
                );
                let reference = plain_minimax(&mut field.clone(), depth, perspective, &memory);
                assert_eq!(pruned, reference, "depth {depth}, {perspective:?}");
            }
        }
    }
}

#[test]
fn test_fixed_field_restored_after_top_level_calls() {
    let mut outposts = crowded_field();
    let before = outposts.clone();
    let mut memory = AttackMemory::new();

    decide(
        &mut outposts,
        &FIXTURE_BASE,
        &mut memory,
        Perspective::Attacker,
        DepthPolicy::ScaledByCount,
    );
    suggest_defense(&mut outposts, &FIXTURE_BASE, &memory, 4);

    assert_eq!(outposts, before);
    assert_eq!(memory.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Pruning never changes the root value or the chosen outpost.
    #[test]
    fn prop_alpha_beta_matches_plain_minimax(
        field in arb_field(5),
        perspective in arb_perspective(),
        memory in arb_memory(5),
        depth in 0u32..=3,
    ) {
        let mut outposts = field.clone();
        let pruned = minimax(
            &mut outposts,
            depth,
            perspective,
            f64::NEG_INFINITY,
            f64::INFINITY,
            &FIXTURE_BASE,
            &memory,
        );
        let reference = plain_minimax(&mut field.clone(), depth, perspective, &memory);
        prop_assert_eq!(pruned, reference);
    }

    /// Every outpost is left exactly as it was, selected or not.
    #[test]
    fn prop_search_restores_every_outpost(
        field in arb_field(6),
        perspective in arb_perspective(),
        memory in arb_memory(6),
        depth in 0u32..=4,
    ) {
        let mut outposts = field.clone();
        let before = snapshots(&outposts);
        minimax(
            &mut outposts,
            depth,
            perspective,
            f64::NEG_INFINITY,
            f64::INFINITY,
            &FIXTURE_BASE,
            &memory,
        );
        prop_assert_eq!(snapshots(&outposts), before);
        prop_assert_eq!(outposts, field);
    }

    /// The search never touches the memory it reads.
    #[test]
    fn prop_search_leaves_memory_alone(
        field in arb_field(5),
        memory in arb_memory(5),
    ) {
        let before = memory.clone();
        let mut outposts = field;
        suggest_defense(&mut outposts, &FIXTURE_BASE, &memory, 3);
        prop_assert_eq!(memory, before);
    }

    /// A chosen target always satisfies the candidate rule of its side.
    #[test]
    fn prop_target_is_a_candidate(
        field in arb_field(5),
        perspective in arb_perspective(),
        depth in 1u32..=3,
    ) {
        let mut outposts = field;
        let outcome = minimax(
            &mut outposts,
            depth,
            perspective,
            f64::NEG_INFINITY,
            f64::INFINITY,
            &FIXTURE_BASE,
            &AttackMemory::new(),
        );
        if let Some(id) = outcome.target {
            let index = outposts.iter().position(|o| o.id == id).unwrap();
            prop_assert!(candidates(&outposts, perspective).contains(&index));
        }
    }

    /// Memory never exceeds its capacity and keeps the newest entries.
    #[test]
    fn prop_memory_is_bounded_fifo(ids in prop::collection::vec(0u32..20, 0..50)) {
        let mut memory = AttackMemory::new();
        for &id in &ids {
            memory.record(OutpostId(id));
            prop_assert!(memory.len() <= 3);
        }
        let expected: Vec<OutpostId> = ids
            .iter()
            .rev()
            .take(3)
            .rev()
            .map(|&id| OutpostId(id))
            .collect();
        prop_assert_eq!(memory.iter().collect::<Vec<_>>(), expected);
    }
}
