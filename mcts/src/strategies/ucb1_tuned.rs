use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy,
};

/// Upper bound on the variance of outcomes normalized to `[-1, 1]`.
const VARIANCE_UPPER_BOUND: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ucb1TunedOptions {
    /// Scales the whole exploration bonus.
    pub exploration_constant: f64,
}

impl Default for Ucb1TunedOptions {
    fn default() -> Self {
        Self {
            exploration_constant: 1.0,
        }
    }
}

impl Hyperparameters for Ucb1TunedOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// UCB1 with the exploration term tightened by the observed variance of each child.
#[derive(Clone, Debug, Default)]
pub struct Ucb1Tuned {
    options: Ucb1TunedOptions,
}

impl Ucb1Tuned {
    pub fn new(options: Ucb1TunedOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Ucb1TunedOptions {
        &self.options
    }
}

impl SelectionStrategy for Ucb1Tuned {
    fn name(&self) -> &'static str {
        "UCB1Tuned"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let agent = node.agent_to_move();
        let parent_log = parent_log_visits(tree, node_id);
        let mut best = BestChild::new();

        for i in 0..node.num_legal_moves() {
            let child = ChildSnapshot::read(tree, node, i);
            let (visits, variance) = match child.child {
                Some(child_id) => {
                    let child_node = tree.node(child_id);
                    let real_visits = child_node.visits().max(1) as f64;
                    let mean_square = child_node.sum_squared_scores(agent) / real_visits;
                    (
                        child.visits_or_one(),
                        (mean_square - child.exploit * child.exploit).max(0.0),
                    )
                }
                None => (1.0, VARIANCE_UPPER_BOUND),
            };

            let ratio = parent_log / visits;
            let bound = VARIANCE_UPPER_BOUND.min(variance + (2.0 * ratio).sqrt());
            let value = child.exploit + self.options.exploration_constant * (ratio * bound).sqrt();
            best.offer(i, value, ctx.rng());
        }

        Ok(best.index())
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
