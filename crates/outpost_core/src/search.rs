//! Depth-limited adversarial search over the outpost set.
//!
//! Minimax with alpha-beta pruning. The defender is the maximizing side and
//! the attacker the minimizing side. Each ply picks one outpost and applies a
//! deterministic stand-in for combat to it:
//!
//! - Attacker ply: target loses 30% of its garrison and 20% of its civilians,
//!   and takes 10 points of damage
//! - Defender ply: target loses 40% of its aliens
//!
//! The stand-in approximates the expected outcome of the real resolver without
//! drawing random numbers, so a search over the same state always returns the
//! same answer.
//!
//! # State discipline
//!
//! The search mutates the caller's outposts in place. Every trial is bracketed
//! by a [`Snapshot`] capture and restore, including trials cut short by
//! pruning, so when a call returns every outpost is exactly as it was before.
//! The attack memory is read but never written during recursion; only
//! [`decide`] records a target, and only for the attacker.
//!
//! # Leaves
//!
//! - All civilians gone: the defender has lost (`-∞` for the defender,
//!   `+∞` for the attacker)
//! - All aliens gone: the defender has won (`+∞` for the defender,
//!   `-∞` for the attacker)
//! - Depth exhausted: the best-scoring outpost for the side to move, scored by
//!   [`evaluate`]
//!
//! A non-terminal node with nothing to pick yields [`SearchOutcome::regroup`].

use serde::{Deserialize, Serialize};

use crate::heuristic::{evaluate, Perspective};
use crate::memory::AttackMemory;
use crate::outpost::{BaseLocation, Outpost, OutpostId, Snapshot};

/// Depth used for AI attacks and player suggestions.
pub const DEFAULT_SEARCH_DEPTH: u32 = 4;

/// Lower bound on count-scaled depth.
pub const MIN_SCALED_DEPTH: u32 = 2;

/// Upper bound on count-scaled depth.
pub const MAX_SCALED_DEPTH: u32 = 4;

/// Garrison fraction lost to an attacker-ply stand-in.
pub const PROXY_MILITARY_LOSS: f64 = 0.3;

/// Civilian fraction lost to an attacker-ply stand-in.
pub const PROXY_POPULATION_LOSS: f64 = 0.2;

/// Damage added by an attacker-ply stand-in.
pub const PROXY_DAMAGE: u32 = 10;

/// Alien fraction lost to a defender-ply stand-in.
pub const PROXY_ALIEN_LOSS: f64 = 0.4;

/// Result of a search: the chosen outpost, if any, and its minimax value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Chosen outpost. `None` at terminal nodes and when regrouping.
    pub target: Option<OutpostId>,
    /// Minimax value. Infinite at terminal nodes.
    pub value: f64,
}

impl SearchOutcome {
    /// No decision: nothing to pick at a non-terminal node.
    #[must_use]
    pub const fn regroup() -> Self {
        Self {
            target: None,
            value: 0.0,
        }
    }

    /// Whether this is a regroup (no target, zero value).
    #[must_use]
    pub fn is_regroup(&self) -> bool {
        self.target.is_none() && self.value == 0.0
    }

    /// Whether the value is a decided win or loss.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.value.is_infinite()
    }
}

/// How deep a top-level decision searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepthPolicy {
    /// Always search this many plies.
    Fixed(u32),
    /// Half the outpost count, clamped to `2..=4`.
    ScaledByCount,
}

impl DepthPolicy {
    /// Depth to use for a set of `outpost_count` outposts.
    #[must_use]
    pub fn depth_for(self, outpost_count: usize) -> u32 {
        match self {
            DepthPolicy::Fixed(depth) => depth,
            DepthPolicy::ScaledByCount => {
                let half = u32::try_from(outpost_count / 2).unwrap_or(u32::MAX);
                half.clamp(MIN_SCALED_DEPTH, MAX_SCALED_DEPTH)
            }
        }
    }
}

impl Default for DepthPolicy {
    fn default() -> Self {
        DepthPolicy::Fixed(DEFAULT_SEARCH_DEPTH)
    }
}

/// Node and cutoff counters for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Nodes visited, leaves included.
    pub nodes: u64,
    /// Times the remaining siblings were skipped.
    pub cutoffs: u64,
}

/// Whether either side has been wiped out.
#[must_use]
pub fn is_terminal(outposts: &[Outpost]) -> bool {
    outposts.iter().all(|o| o.population == 0) || outposts.iter().all(|o| o.aliens == 0)
}

/// Value of a decided position from `perspective`, or `None` if undecided.
#[must_use]
pub fn terminal_value(outposts: &[Outpost], perspective: Perspective) -> Option<f64> {
    let defender_value = if outposts.iter().all(|o| o.population == 0) {
        f64::NEG_INFINITY
    } else if outposts.iter().all(|o| o.aliens == 0) {
        f64::INFINITY
    } else {
        return None;
    };

    Some(match perspective {
        Perspective::Defender => defender_value,
        Perspective::Attacker => -defender_value,
    })
}

/// Indices of the outposts a ply may pick.
///
/// The defender only reinforces outposts that still have civilians to save
/// and aliens to fight. The attacker may pick any outpost with civilians.
#[must_use]
pub fn candidates(outposts: &[Outpost], perspective: Perspective) -> Vec<usize> {
    outposts
        .iter()
        .enumerate()
        .filter(|(_, o)| match perspective {
            Perspective::Defender => o.is_contested(),
            Perspective::Attacker => o.is_populated(),
        })
        .map(|(i, _)| i)
        .collect()
}

/// Apply the deterministic combat stand-in for one ply.
pub fn simulate_proxy(outpost: &mut Outpost, perspective: Perspective) {
    match perspective {
        Perspective::Attacker => {
            let military_loss = (f64::from(outpost.military) * PROXY_MILITARY_LOSS) as u32;
            let population_loss = (f64::from(outpost.population) * PROXY_POPULATION_LOSS) as u32;
            outpost.military = outpost.military.saturating_sub(military_loss);
            outpost.population = outpost.population.saturating_sub(population_loss);
            outpost.damage = outpost.damage.saturating_add(PROXY_DAMAGE);
        }
        Perspective::Defender => {
            let alien_loss = (f64::from(outpost.aliens) * PROXY_ALIEN_LOSS) as u32;
            outpost.aliens = outpost.aliens.saturating_sub(alien_loss);
        }
    }
}

/// Score a depth-exhausted or decided node.
fn leaf<B: BaseLocation + ?Sized>(
    outposts: &[Outpost],
    perspective: Perspective,
    base: &B,
    memory: &AttackMemory,
) -> SearchOutcome {
    if let Some(value) = terminal_value(outposts, perspective) {
        return SearchOutcome {
            target: None,
            value,
        };
    }

    // Leaf candidates: the attacker needs civilians and aliens present.
    let mut best: Option<(OutpostId, i64)> = None;
    for outpost in outposts.iter().filter(|o| match perspective {
        Perspective::Defender => o.is_populated(),
        Perspective::Attacker => o.is_contested(),
    }) {
        let score = evaluate(outpost, perspective, base, memory);
        // First of equal scores wins
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((outpost.id, score));
        }
    }

    match best {
        Some((id, score)) => SearchOutcome {
            target: Some(id),
            value: score as f64,
        },
        None => SearchOutcome::regroup(),
    }
}

fn search<B: BaseLocation + ?Sized>(
    outposts: &mut [Outpost],
    depth: u32,
    perspective: Perspective,
    mut alpha: f64,
    mut beta: f64,
    base: &B,
    memory: &AttackMemory,
    stats: &mut SearchStats,
) -> SearchOutcome {
    stats.nodes += 1;

    if depth == 0 || is_terminal(outposts) {
        return leaf(outposts, perspective, base, memory);
    }

    let picks = candidates(outposts, perspective);
    if picks.is_empty() {
        return SearchOutcome::regroup();
    }

    let maximizing = perspective.is_maximizing();
    let mut best = SearchOutcome {
        target: None,
        value: if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        },
    };

    for index in picks {
        let snapshot = Snapshot::capture(&outposts[index]);
        simulate_proxy(&mut outposts[index], perspective);

        let child = search(
            outposts,
            depth - 1,
            perspective.opponent(),
            alpha,
            beta,
            base,
            memory,
            stats,
        );

        snapshot.restore(&mut outposts[index]);

        if maximizing {
            if child.value > best.value {
                best = SearchOutcome {
                    target: Some(outposts[index].id),
                    value: child.value,
                };
            }
            alpha = alpha.max(best.value);
        } else {
            if child.value < best.value {
                best = SearchOutcome {
                    target: Some(outposts[index].id),
                    value: child.value,
                };
            }
            beta = beta.min(best.value);
        }

        if beta <= alpha {
            stats.cutoffs += 1;
            break;
        }
    }

    best
}

/// Run minimax with alpha-beta pruning and report search statistics.
///
/// See the module docs for leaf values and the state-restoration guarantee.
pub fn minimax_with_stats<B: BaseLocation + ?Sized>(
    outposts: &mut [Outpost],
    depth: u32,
    perspective: Perspective,
    alpha: f64,
    beta: f64,
    base: &B,
    memory: &AttackMemory,
) -> (SearchOutcome, SearchStats) {
    let mut stats = SearchStats::default();
    let outcome = search(
        outposts,
        depth,
        perspective,
        alpha,
        beta,
        base,
        memory,
        &mut stats,
    );
    tracing::trace!(
        depth,
        ?perspective,
        nodes = stats.nodes,
        cutoffs = stats.cutoffs,
        target = ?outcome.target,
        value = outcome.value,
        "Search finished"
    );
    (outcome, stats)
}

/// Run minimax with alpha-beta pruning.
///
/// `alpha`/`beta` are normally `-∞`/`+∞` at the root. The outposts are left
/// exactly as they were passed in.
pub fn minimax<B: BaseLocation + ?Sized>(
    outposts: &mut [Outpost],
    depth: u32,
    perspective: Perspective,
    alpha: f64,
    beta: f64,
    base: &B,
    memory: &AttackMemory,
) -> SearchOutcome {
    minimax_with_stats(outposts, depth, perspective, alpha, beta, base, memory).0
}

/// Top-level decision for one side.
///
/// Searches with a full window at the depth chosen by `policy`. When deciding
/// for the attacker, the chosen target is appended to `memory`.
pub fn decide<B: BaseLocation + ?Sized>(
    outposts: &mut [Outpost],
    base: &B,
    memory: &mut AttackMemory,
    perspective: Perspective,
    policy: DepthPolicy,
) -> SearchOutcome {
    let depth = policy.depth_for(outposts.len());
    let outcome = minimax(
        outposts,
        depth,
        perspective,
        f64::NEG_INFINITY,
        f64::INFINITY,
        base,
        memory,
    );

    if perspective == Perspective::Attacker {
        if let Some(target) = outcome.target {
            memory.record(target);
        }
    }

    outcome
}

/// Advisory defender search for the player.
///
/// Unlike [`decide`], this never touches the attack memory: a suggestion the
/// player may ignore must not bias the attacker's later choices.
pub fn suggest_defense<B: BaseLocation + ?Sized>(
    outposts: &mut [Outpost],
    base: &B,
    memory: &AttackMemory,
    depth: u32,
) -> SearchOutcome {
    minimax(
        outposts,
        depth,
        Perspective::Defender,
        f64::NEG_INFINITY,
        f64::INFINITY,
        base,
        memory,
    )
}
