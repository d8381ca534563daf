use anyhow::{anyhow, Result};
use common::div_or_zero;
use model::AlphaBetaBounds;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ucb1_exploration, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy,
};

/// How the exploitation value is placed relative to the node's `[alpha, beta]` bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueAdjustment {
    /// `q`
    #[default]
    None,
    /// `clamp(q, alpha, beta)`
    Clamp,
    /// `(q - alpha)/w`
    Normalize,
    /// `2(q - alpha)/w - 1`
    NormalizeSymmetric,
    /// `(q - alpha)/(w + |q - alpha|)`
    Squash,
}

impl ValueAdjustment {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Clamp),
            2 => Some(Self::Normalize),
            3 => Some(Self::NormalizeSymmetric),
            4 => Some(Self::Squash),
            _ => None,
        }
    }

    pub fn apply(self, q: f64, bounds: &AlphaBetaBounds) -> f64 {
        let width = bounds.width();
        let offset = q - bounds.alpha;
        match self {
            Self::None => q,
            Self::Clamp => q.max(bounds.alpha).min(bounds.beta),
            Self::Normalize => div_or_zero(offset, width),
            Self::NormalizeSymmetric => 2.0 * div_or_zero(offset, width) - 1.0,
            Self::Squash => div_or_zero(offset, width + offset.abs()),
        }
    }
}

/// How the exploration width is scaled by the width `w` of the node's bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidthAdjustment {
    /// `e`
    #[default]
    None,
    /// `e·w/2`
    HalfWidth,
    /// `e·w/(w + e)`
    Saturating,
    /// `min(e, w)`
    Capped,
}

impl WidthAdjustment {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::HalfWidth),
            2 => Some(Self::Saturating),
            3 => Some(Self::Capped),
            _ => None,
        }
    }

    pub fn apply(self, e: f64, bounds: &AlphaBetaBounds) -> f64 {
        let width = bounds.width();
        match self {
            Self::None => e,
            Self::HalfWidth => e * width / 2.0,
            Self::Saturating => div_or_zero(e * width, width + e),
            Self::Capped => e.min(width),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ucb1AlphaBetaOptions {
    pub exploration_constant: f64,
    #[serde(rename = "valadj")]
    pub value_adjustment: ValueAdjustment,
    #[serde(rename = "ciadjust")]
    pub width_adjustment: WidthAdjustment,
}

impl Default for Ucb1AlphaBetaOptions {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            value_adjustment: ValueAdjustment::None,
            width_adjustment: WidthAdjustment::None,
        }
    }
}

impl Hyperparameters for Ucb1AlphaBetaOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        let code = || value.parse::<u32>().ok();
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            "valadj" => match code().and_then(ValueAdjustment::from_code) {
                Some(adjustment) => {
                    self.value_adjustment = adjustment;
                    OverrideResult::Applied
                }
                None => OverrideResult::InvalidValue,
            },
            "ciadjust" => match code().and_then(WidthAdjustment::from_code) {
                Some(adjustment) => {
                    self.width_adjustment = adjustment;
                    OverrideResult::Applied
                }
                None => OverrideResult::InvalidValue,
            },
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// UCB1 whose value and exploration terms are rescaled by static alpha-beta bounds on the node.
///
/// Nodes must carry bounds. Bounds that are not finite leave plain UCB1.
#[derive(Clone, Debug, Default)]
pub struct Ucb1AlphaBeta {
    options: Ucb1AlphaBetaOptions,
}

impl Ucb1AlphaBeta {
    pub fn new(options: Ucb1AlphaBetaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Ucb1AlphaBetaOptions {
        &self.options
    }
}

impl SelectionStrategy for Ucb1AlphaBeta {
    fn name(&self) -> &'static str {
        "UCB1AlphaBeta"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let bounds = node
            .bounds()
            .ok_or_else(|| anyhow!("{}: node has no alpha-beta bounds", self.name()))?;
        let finite = bounds.is_finite();

        let parent_log = parent_log_visits(tree, node_id);
        let mut best = BestChild::new();

        for i in 0..node.num_legal_moves() {
            let child = ChildSnapshot::read(tree, node, i);
            let e = ucb1_exploration(parent_log, child.visits_or_one());
            let (value, width) = if finite {
                (
                    self.options.value_adjustment.apply(child.exploit, bounds),
                    self.options.width_adjustment.apply(e, bounds),
                )
            } else {
                (child.exploit, e)
            };

            best.offer(i, value + self.options.exploration_constant * width, ctx.rng());
        }

        Ok(best.index())
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}
