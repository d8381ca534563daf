use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, NodeId, SearchAction, SearchContext, SearchNode, SearchTree,
    SelectionStrategy,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ag0Options {
    pub exploration_constant: f64,
}

impl Default for Ag0Options {
    fn default() -> Self {
        Self {
            exploration_constant: 2.5,
        }
    }
}

impl Hyperparameters for Ag0Options {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// PUCB as used by AlphaGo Zero: `q + C·P(a)·sqrt(Σn)/(1 + n)`.
#[derive(Clone, Debug, Default)]
pub struct Ag0 {
    options: Ag0Options,
}

impl Ag0 {
    pub fn new(options: Ag0Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Ag0Options {
        &self.options
    }
}

/// Argmax of the PUCB score with `prior(i)` standing in for the learned policy.
pub(crate) fn select_pucb<A, F>(
    ctx: &mut SearchContext,
    tree: &SearchTree<A>,
    node_id: NodeId,
    exploration_constant: f64,
    prior: F,
) -> usize
where
    A: SearchAction,
    F: Fn(&SearchNode<A>, usize) -> f64,
{
    let node = tree.node(node_id);
    let sqrt_parent_visits = (tree.sum_legal_child_visits(node_id) as f64).sqrt();
    let mut best = BestChild::new();

    for i in 0..node.num_legal_moves() {
        let child = ChildSnapshot::read(tree, node, i);
        let explore = prior(node, i) * sqrt_parent_visits / (1.0 + child.visits as f64);
        best.offer(i, child.exploit + exploration_constant * explore, ctx.rng());
    }

    best.index()
}

impl SelectionStrategy for Ag0 {
    fn name(&self) -> &'static str {
        "AG0"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        ensure_legal_moves(self.name(), tree.node(node_id))?;

        Ok(select_pucb(
            ctx,
            tree,
            node_id,
            self.options.exploration_constant,
            |node, i| node.prior(i) as f64,
        ))
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
