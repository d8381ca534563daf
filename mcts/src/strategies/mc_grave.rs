use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, grave::select_grave};
use crate::customise::{apply_overrides, set_f64, set_u32, Hyperparameters, OverrideResult};
use crate::{BackpropFlags, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McGraveOptions {
    /// Visits a node needs before it becomes the AMAF reference for its subtree.
    #[serde(rename = "ref")]
    pub ref_visits: u32,
    pub bias: f64,
}

impl Default for McGraveOptions {
    fn default() -> Self {
        Self {
            ref_visits: 100,
            bias: 1e-5,
        }
    }
}

impl Hyperparameters for McGraveOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "ref" => set_u32(&mut self.ref_visits, value),
            "bias" => set_f64(&mut self.bias, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// Generalized RAVE without an exploration term. AMAF means come from the closest ancestor with
/// more than `ref` visits.
#[derive(Clone, Debug, Default)]
pub struct McGrave {
    options: McGraveOptions,
}

impl McGrave {
    pub fn new(options: McGraveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &McGraveOptions {
        &self.options
    }
}

impl SelectionStrategy for McGrave {
    fn name(&self) -> &'static str {
        "MC-GRAVE"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        ensure_legal_moves(self.name(), tree.node(node_id))?;

        Ok(select_grave(
            ctx,
            tree,
            node_id,
            self.options.ref_visits,
            self.options.bias,
            None,
        ))
    }

    fn backprop_flags(&self) -> BackpropFlags {
        BackpropFlags::GRAVE_STATS
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
