use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ag0::select_pucb, ensure_legal_moves};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoisyAg0Options {
    pub exploration_constant: f64,
    /// Weight of the uniform distribution mixed into the prior.
    pub uniform_dist_weight: f64,
}

impl Default for NoisyAg0Options {
    fn default() -> Self {
        Self {
            exploration_constant: 2.5,
            uniform_dist_weight: 0.25,
        }
    }
}

impl Hyperparameters for NoisyAg0Options {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            "uniformdistweight" => set_f64(&mut self.uniform_dist_weight, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// PUCB over `(1 - w)·P(a) + w/|A|`.
#[derive(Clone, Debug, Default)]
pub struct NoisyAg0 {
    options: NoisyAg0Options,
}

impl NoisyAg0 {
    pub fn new(options: NoisyAg0Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NoisyAg0Options {
        &self.options
    }
}

impl SelectionStrategy for NoisyAg0 {
    fn name(&self) -> &'static str {
        "NoisyAG0"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let weight = self.options.uniform_dist_weight;
        let uniform = 1.0 / node.num_legal_moves() as f64;

        Ok(select_pucb(
            ctx,
            tree,
            node_id,
            self.options.exploration_constant,
            |node, i| (1.0 - weight) * node.prior(i) as f64 + weight * uniform,
        ))
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
