use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, grave::blend_with_amaf, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, BackpropFlags, MoveKey, NodeId, NodeStatistics, SearchAction,
    SearchContext, SearchTree, SelectionStrategy,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McBraveOptions {
    pub bias: f64,
}

impl Default for McBraveOptions {
    fn default() -> Self {
        Self { bias: 1e-5 }
    }
}

impl Hyperparameters for McBraveOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "bias" => set_f64(&mut self.bias, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// RAVE variant that pools the AMAF entries of every ancestor, from the node up to the root.
#[derive(Clone, Debug, Default)]
pub struct McBrave {
    options: McBraveOptions,
}

impl McBrave {
    pub fn new(options: McBraveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &McBraveOptions {
        &self.options
    }
}

fn pooled_amaf<A: SearchAction>(
    tree: &SearchTree<A>,
    node_id: NodeId,
    key: &MoveKey<A>,
) -> Option<NodeStatistics> {
    let mut pooled = NodeStatistics::default();
    let mut current = Some(node_id);

    while let Some(id) = current {
        let node = tree.node(id);
        if let Some(stats) = node.grave_stats().get(key) {
            pooled.merge(&stats);
        }
        current = node.parent();
    }

    (pooled.visit_count > 0).then_some(pooled)
}

impl SelectionStrategy for McBrave {
    fn name(&self) -> &'static str {
        "MC-BRAVE"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let mut best = BestChild::new();

        for i in 0..node.num_legal_moves() {
            let child = ChildSnapshot::read(tree, node, i);
            let key = MoveKey::new(node.legal_action(i).clone(), node.depth());
            let amaf = pooled_amaf(tree, node_id, &key);
            let value = blend_with_amaf(child.exploit, child.visits, amaf, self.options.bias);
            best.offer(i, value, ctx.rng());
        }

        Ok(best.index())
    }

    fn backprop_flags(&self) -> BackpropFlags {
        BackpropFlags::GRAVE_STATS
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
