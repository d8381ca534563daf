use anyhow::Result;
use itertools::Itertools;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::tie_break::select_best;
use crate::{NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy};

const BISECTION_ITERATIONS: usize = 64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegPolOptOptions {
    pub exploration_constant: f64,
}

impl Default for RegPolOptOptions {
    fn default() -> Self {
        Self {
            exploration_constant: 2.5,
        }
    }
}

impl Hyperparameters for RegPolOptOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// Samples from the regularized policy `π(a) = λ·P(a)/(α - q(a))` instead of taking an argmax.
///
/// `λ = C·sqrt(Σn)/(Σn + |A|)` and `α` is chosen so that `π` sums to one. When `π` cannot be
/// formed the strategy falls back to the greedy choice over `q`.
#[derive(Clone, Debug, Default)]
pub struct RegPolOpt {
    options: RegPolOptOptions,
}

impl RegPolOpt {
    pub fn new(options: RegPolOptOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RegPolOptOptions {
        &self.options
    }
}

/// `λ = C·sqrt(Σn)/(Σn + |A|)`, the weight of the prior in the regularized policy.
pub fn regularization_weight(
    exploration_constant: f64,
    parent_visits: u64,
    num_legal_moves: usize,
) -> f64 {
    let parent_visits = parent_visits as f64;
    exploration_constant * parent_visits.sqrt() / (parent_visits + num_legal_moves as f64)
}

/// Solves for `π(a) = λ·prior(a)/(α - q(a))` with `Σπ = 1` by bisection on `α`.
///
/// `prior` is normalized first; a prior without mass is treated as uniform. Returns `None` for
/// a non-positive `λ` or when the solution is not a finite distribution.
pub fn regularized_policy(q: &[f64], prior: &[f64], lambda: f64) -> Option<Vec<f64>> {
    if q.is_empty() || q.len() != prior.len() || !lambda.is_finite() || lambda <= 0.0 {
        return None;
    }

    let prior_sum: f64 = prior.iter().filter(|p| **p > 0.0).sum();
    let normalized = if prior_sum > 0.0 && prior_sum.is_finite() {
        prior.iter().map(|p| p.max(0.0) / prior_sum).collect_vec()
    } else {
        vec![1.0 / prior.len() as f64; prior.len()]
    };
    let prior = normalized.as_slice();

    let policy_at = move |alpha: f64| {
        q.iter()
            .zip(prior)
            .map(move |(q, p)| if *p > 0.0 { lambda * p / (alpha - q) } else { 0.0 })
    };
    let supported = move || q.iter().zip(prior).filter(|(_, p)| **p > 0.0);

    let mut alpha_min = supported()
        .map(|(q, p)| q + lambda * p)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut alpha_max = supported()
        .map(|(q, _)| q + lambda)
        .fold(f64::NEG_INFINITY, f64::max);

    if !alpha_min.is_finite() || !alpha_max.is_finite() {
        return None;
    }

    for _ in 0..BISECTION_ITERATIONS {
        let alpha = (alpha_min + alpha_max) / 2.0;
        if policy_at(alpha).sum::<f64>() > 1.0 {
            alpha_min = alpha;
        } else {
            alpha_max = alpha;
        }
    }

    let policy = policy_at(alpha_max).collect_vec();
    let total: f64 = policy.iter().sum();
    let valid = total > 0.0 && total.is_finite() && policy.iter().all(|p| *p >= 0.0);

    valid.then_some(policy)
}

impl SelectionStrategy for RegPolOpt {
    fn name(&self) -> &'static str {
        "RegPolOpt"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let num_legal_moves = node.num_legal_moves();
        let q = (0..num_legal_moves)
            .map(|i| ChildSnapshot::read(tree, node, i).exploit)
            .collect_vec();
        let prior = node
            .learned_selection_policy()
            .iter()
            .map(|p| *p as f64)
            .collect_vec();

        let lambda = regularization_weight(
            self.options.exploration_constant,
            tree.sum_legal_child_visits(node_id),
            num_legal_moves,
        );

        let sampled = regularized_policy(&q, &prior, lambda)
            .and_then(|policy| WeightedIndex::new(&policy).ok())
            .map(|distribution| distribution.sample(ctx.rng()));

        Ok(match sampled {
            Some(index) => index,
            None => select_best(q.iter().copied(), ctx.rng()),
        })
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
