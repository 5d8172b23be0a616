//! Plan Arbitration
//!
//! Picks the subset of plans with the greatest total importance that the
//! available resources can satisfy jointly, and splits plans into accepted
//! and rejected.
//!
//! A subset is jointly satisfiable when every exclusive resource its plans
//! request is available, no exclusive resource is requested by two of its
//! plans, and its summed energy request fits the available energy.
//!
//! Among equally important subsets the one with fewer plans wins, then the
//! one whose plan indices come first lexicographically. The empty subset is
//! always satisfiable, so arbitration always has an answer.
//!
//! The search is exact by default: every subset of plans is a bitmask, so
//! `n` plans cost `2^n` feasibility checks. Above
//! [`ArbiterConfig::exhaustive_limit`] plans the search switches to a
//! branch and bound that prunes on an importance upper bound and returns
//! the same answer. [`ArbiterStrategy::Greedy`] trades exactness for a
//! linear pass. Callers bound the worst case by capping how many plans they
//! submit.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::{ArbiterConfig, ArbiterStrategy};
use crate::error::PlannerError;
use crate::objective::Plan;
use crate::resources::{aggregate, ResourceBundle};

/// Largest plan count representable as a bitmask.
const MASK_BITS: usize = 63;

/// Outcome of one arbitration: both halves keep submission order.
#[derive(Debug, Clone, Default)]
pub struct Arbitration {
    pub accepted: Vec<Plan>,
    pub rejected: Vec<Plan>,
}

impl Arbitration {
    /// Summed importance of the accepted plans.
    pub fn accepted_importance(&self) -> f64 {
        self.accepted.iter().map(Plan::importance).sum()
    }
}

/// Splits `plans` into the best jointly satisfiable subset and the rest.
pub fn arbitrate(
    available: &ResourceBundle,
    plans: Vec<Plan>,
    config: &ArbiterConfig,
) -> Result<Arbitration, PlannerError> {
    for plan in &plans {
        plan.validate()?;
    }

    let chosen = select(available, &plans, config);
    debug!(
        plans = plans.len(),
        accepted = chosen.len(),
        "arbitration complete"
    );

    let mut arbitration = Arbitration::default();
    for (index, plan) in plans.into_iter().enumerate() {
        if chosen.binary_search(&index).is_ok() {
            arbitration.accepted.push(plan);
        } else {
            arbitration.rejected.push(plan);
        }
    }
    Ok(arbitration)
}

/// Removes everything the accepted plans requested from `available`.
///
/// The plans must be jointly satisfiable; otherwise this is an invariant
/// violation and `available` is left untouched.
pub fn commit(available: &mut ResourceBundle, accepted: &[Plan]) -> Result<(), PlannerError> {
    let total = aggregate(accepted.iter().map(Plan::request))?;
    *available = available.difference(&total)?;
    Ok(())
}

/// Whether `available` can satisfy all of `plans` at once.
pub fn can_satisfy_all(available: &ResourceBundle, plans: &[Plan]) -> bool {
    aggregate(plans.iter().map(Plan::request))
        .map(|total| available.can_satisfy(&total))
        .unwrap_or(false)
}

/// Per-plan facts the searches share. Only individually satisfiable plans
/// become candidates; any subset containing another plan is infeasible.
struct Candidates {
    /// Original plan index of each candidate, ascending
    index: Vec<usize>,
    importance: Vec<f64>,
    energy: Vec<u64>,
    /// `conflicts[a][b]`: candidates a and b claim a common resource
    conflicts: Vec<Vec<bool>>,
    budget: u64,
}

impl Candidates {
    fn new(available: &ResourceBundle, plans: &[Plan]) -> Self {
        let index: Vec<usize> = plans
            .iter()
            .enumerate()
            .filter(|(_, plan)| available.can_satisfy(plan.request()))
            .map(|(i, _)| i)
            .collect();

        let conflicts = index
            .iter()
            .map(|&a| {
                index
                    .iter()
                    .map(|&b| a != b && !plans[a].request().is_disjoint(plans[b].request()))
                    .collect()
            })
            .collect();

        Self {
            importance: index.iter().map(|&i| plans[i].importance()).collect(),
            energy: index.iter().map(|&i| plans[i].request().energy).collect(),
            conflicts,
            budget: available.energy,
            index,
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    /// Importance of a set of candidate positions, summed in ascending
    /// position order so every search computes identical values.
    fn importance_of(&self, members: &[usize]) -> f64 {
        let mut sorted = members.to_vec();
        sorted.sort_unstable();
        sorted.iter().map(|&k| self.importance[k]).sum()
    }

    fn fits(&self, members: &[usize], candidate: usize, energy_used: u64) -> bool {
        energy_used.saturating_add(self.energy[candidate]) <= self.budget
            && members.iter().all(|&m| !self.conflicts[m][candidate])
    }

    fn to_plan_indices(&self, members: &[usize]) -> Vec<usize> {
        let mut indices: Vec<usize> = members.iter().map(|&k| self.index[k]).collect();
        indices.sort_unstable();
        indices
    }
}

/// A scored subset of candidate positions, members ascending.
#[derive(Debug, Clone)]
struct Best {
    importance: f64,
    members: Vec<usize>,
}

impl Best {
    fn empty() -> Self {
        Self {
            importance: 0.0,
            members: Vec::new(),
        }
    }

    /// Whether `self` ranks strictly ahead of `other`.
    fn beats(&self, other: &Best) -> bool {
        match self.importance.total_cmp(&other.importance) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.members.len().cmp(&other.members.len()) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => self.members < other.members,
            },
        }
    }
}

/// Original indices of the winning subset, ascending.
fn select(available: &ResourceBundle, plans: &[Plan], config: &ArbiterConfig) -> Vec<usize> {
    let candidates = Candidates::new(available, plans);

    let members = match config.strategy {
        ArbiterStrategy::Exhaustive
            if candidates.len() <= config.exhaustive_limit.min(MASK_BITS) =>
        {
            search_exhaustive(&candidates)
        }
        ArbiterStrategy::Exhaustive | ArbiterStrategy::BranchAndBound => {
            search_branch_and_bound(&candidates)
        }
        ArbiterStrategy::Greedy => search_greedy(&candidates),
    };

    candidates.to_plan_indices(&members)
}

fn search_exhaustive(candidates: &Candidates) -> Vec<usize> {
    let n = candidates.len();
    let conflict_masks: Vec<u64> = (0..n)
        .map(|a| {
            (0..n)
                .filter(|&b| candidates.conflicts[a][b])
                .fold(0u64, |mask, b| mask | (1 << b))
        })
        .collect();

    let mut best = Best::empty();
    let total: u64 = 1 << n;
    debug!(subsets = total, "enumerating plan subsets");

    for mask in 1..total {
        let mut energy = 0u64;
        let mut feasible = true;
        for k in 0..n {
            if mask & (1 << k) == 0 {
                continue;
            }
            energy = energy.saturating_add(candidates.energy[k]);
            if mask & conflict_masks[k] != 0 || energy > candidates.budget {
                feasible = false;
                break;
            }
        }
        if !feasible {
            continue;
        }

        let members: Vec<usize> = (0..n).filter(|&k| mask & (1 << k) != 0).collect();
        let subset = Best {
            importance: candidates.importance_of(&members),
            members,
        };
        if subset.beats(&best) {
            best = subset;
        }
    }

    best.members
}

fn search_branch_and_bound(candidates: &Candidates) -> Vec<usize> {
    // Visit the most important plans first so good incumbents appear early.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates.importance[b]
            .total_cmp(&candidates.importance[a])
            .then(a.cmp(&b))
    });

    // remaining[d]: importance still obtainable from order[d..]
    let mut remaining = vec![0.0; order.len() + 1];
    for d in (0..order.len()).rev() {
        remaining[d] = remaining[d + 1] + candidates.importance[order[d]];
    }

    let mut search = BranchAndBound {
        candidates,
        order: &order,
        remaining: &remaining,
        chosen: Vec::new(),
        best: Best::empty(),
        visited: 0,
    };
    search.descend(0, 0.0, 0);
    debug!(nodes = search.visited, "branch and bound finished");

    search.best.members
}

struct BranchAndBound<'a> {
    candidates: &'a Candidates,
    order: &'a [usize],
    remaining: &'a [f64],
    chosen: Vec<usize>,
    best: Best,
    visited: u64,
}

impl BranchAndBound<'_> {
    fn descend(&mut self, depth: usize, importance: f64, energy: u64) {
        self.visited += 1;

        // Bounds are summed in a different order than final scores, so allow
        // for rounding before pruning a branch that could tie.
        let bound = importance + self.remaining[depth];
        let slack = 1e-9 * self.best.importance.abs().max(1.0);
        if bound + slack < self.best.importance {
            return;
        }

        if depth == self.order.len() {
            let mut members = self.chosen.clone();
            members.sort_unstable();
            let subset = Best {
                importance: self.candidates.importance_of(&members),
                members,
            };
            if subset.beats(&self.best) {
                self.best = subset;
            }
            return;
        }

        let candidate = self.order[depth];
        if self.candidates.fits(&self.chosen, candidate, energy) {
            self.chosen.push(candidate);
            self.descend(
                depth + 1,
                importance + self.candidates.importance[candidate],
                energy + self.candidates.energy[candidate],
            );
            self.chosen.pop();
        }
        self.descend(depth + 1, importance, energy);
    }
}

fn search_greedy(candidates: &Candidates) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates.importance[b]
            .total_cmp(&candidates.importance[a])
            .then(a.cmp(&b))
    });

    let mut chosen = Vec::new();
    let mut energy = 0u64;
    for candidate in order {
        if candidates.fits(&chosen, candidate, energy) {
            energy += candidates.energy[candidate];
            chosen.push(candidate);
        }
    }
    chosen.sort_unstable();
    chosen
}
