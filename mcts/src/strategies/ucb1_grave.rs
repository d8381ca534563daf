use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, grave::select_grave};
use crate::customise::{apply_overrides, set_f64, set_u32, Hyperparameters, OverrideResult};
use crate::{BackpropFlags, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ucb1GraveOptions {
    #[serde(rename = "ref")]
    pub ref_visits: u32,
    pub bias: f64,
    pub exploration_constant: f64,
}

impl Default for Ucb1GraveOptions {
    fn default() -> Self {
        Self {
            ref_visits: 100,
            bias: 1e-5,
            exploration_constant: std::f64::consts::SQRT_2,
        }
    }
}

impl Hyperparameters for Ucb1GraveOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "ref" => set_u32(&mut self.ref_visits, value),
            "bias" => set_f64(&mut self.bias, value),
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// MC-GRAVE with a UCB1 exploration term added to the blended value.
#[derive(Clone, Debug, Default)]
pub struct Ucb1Grave {
    options: Ucb1GraveOptions,
}

impl Ucb1Grave {
    pub fn new(options: Ucb1GraveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Ucb1GraveOptions {
        &self.options
    }
}

impl SelectionStrategy for Ucb1Grave {
    fn name(&self) -> &'static str {
        "UCB1-GRAVE"
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
            Some(self.options.exploration_constant),
        ))
    }

    fn backprop_flags(&self) -> BackpropFlags {
        BackpropFlags::GRAVE_STATS
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
