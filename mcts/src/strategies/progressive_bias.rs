use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ucb1_exploration, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, ExpansionFlags, NodeId, SearchAction, SearchContext, SearchTree,
    SelectionStrategy,
};

const HEURISTIC_WEIGHT: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveBiasOptions {
    pub exploration_constant: f64,
}

impl Default for ProgressiveBiasOptions {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
        }
    }
}

impl Hyperparameters for ProgressiveBiasOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// UCB1 plus a heuristic bonus that fades with visits: `10·h/max(1, n)`.
///
/// Children must be expanded with heuristic estimates.
#[derive(Clone, Debug, Default)]
pub struct ProgressiveBias {
    options: ProgressiveBiasOptions,
}

impl ProgressiveBias {
    pub fn new(options: ProgressiveBiasOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProgressiveBiasOptions {
        &self.options
    }
}

impl SelectionStrategy for ProgressiveBias {
    fn name(&self) -> &'static str {
        "ProgressiveBias"
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
            let heuristic = match child.child {
                Some(child_id) => tree
                    .node(child_id)
                    .heuristic_value_estimates()
                    .and_then(|values| values.get(agent).copied())
                    .ok_or_else(|| {
                        anyhow!(
                            "{}: child {} was expanded without heuristic estimates",
                            self.name(),
                            i
                        )
                    })?,
                None => node.unvisited_value_estimate(),
            };

            let visits = child.visits_or_one();
            let value = child.exploit
                + self.options.exploration_constant * ucb1_exploration(parent_log, visits)
                + HEURISTIC_WEIGHT * heuristic / visits;
            best.offer(i, value, ctx.rng());
        }

        Ok(best.index())
    }

    fn expansion_flags(&self) -> ExpansionFlags {
        ExpansionFlags::HEURISTIC_INIT
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
