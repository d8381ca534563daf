mod ag0;
mod exit;
mod grave;
mod mc_brave;
mod mc_grave;
mod noisy_ag0;
mod progressive_bias;
mod progressive_history;
mod reg_pol_opt;
mod ucb1;
mod ucb1_alpha_beta;
mod ucb1_grave;
mod ucb1_tuned;

#[cfg(test)]
mod test_support;

pub use ag0::*;
pub use exit::*;
pub use grave::*;
pub use mc_brave::*;
pub use mc_grave::*;
pub use noisy_ag0::*;
pub use progressive_bias::*;
pub use progressive_history::*;
pub use reg_pol_opt::*;
pub use ucb1::*;
pub use ucb1_alpha_beta::*;
pub use ucb1_grave::*;
pub use ucb1_tuned::*;

use anyhow::{anyhow, bail, Result};

use crate::{
    BackpropFlags, ExpansionFlags, NodeId, SearchAction, SearchContext, SearchNode, SearchTree,
    SelectionStrategy,
};

/// What a strategy sees of one child slot, from the perspective of the agent choosing it.
///
/// Empty slots carry the parent's unvisited value estimate and zero visits.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChildSnapshot {
    pub child: Option<NodeId>,
    pub exploit: f64,
    /// Real plus virtual visits.
    pub visits: u32,
}

impl ChildSnapshot {
    pub fn read<A: SearchAction>(tree: &SearchTree<A>, node: &SearchNode<A>, index: usize) -> Self {
        match node.child(index) {
            Some(child_id) => {
                let child = tree.node(child_id);
                Self {
                    child: Some(child_id),
                    exploit: child.exploitation_score(node.agent_to_move()),
                    visits: child.total_visits(),
                }
            }
            None => Self {
                child: None,
                exploit: node.unvisited_value_estimate(),
                visits: 0,
            },
        }
    }

    /// Visit count for exploration denominators, at least one.
    pub fn visits_or_one(&self) -> f64 {
        self.visits.max(1) as f64
    }
}

/// `ln(max(1, Σ child visits))`, the numerator shared by the UCB1 style terms.
pub(crate) fn parent_log_visits<A: SearchAction>(tree: &SearchTree<A>, node_id: NodeId) -> f64 {
    (tree.sum_legal_child_visits(node_id).max(1) as f64).ln()
}

pub(crate) fn ucb1_exploration(parent_log: f64, visits: f64) -> f64 {
    (parent_log / visits.max(1.0)).sqrt()
}

pub(crate) fn ensure_legal_moves<A>(strategy: &str, node: &SearchNode<A>) -> Result<()> {
    if node.num_legal_moves() == 0 {
        bail!("{}: cannot select from a node without legal moves", strategy);
    }
    Ok(())
}

/// Every selection strategy, selectable by name at run time.
#[derive(Clone, Debug)]
pub enum SelectionStrategies {
    Ucb1(Ucb1),
    Ucb1Tuned(Ucb1Tuned),
    Ucb1AlphaBeta(Ucb1AlphaBeta),
    Ag0(Ag0),
    NoisyAg0(NoisyAg0),
    ExIt(ExIt),
    ProgressiveBias(ProgressiveBias),
    ProgressiveHistory(ProgressiveHistory),
    McGrave(McGrave),
    Ucb1Grave(Ucb1Grave),
    McBrave(McBrave),
    RegPolOpt(RegPolOpt),
}

macro_rules! dispatch {
    ($self:expr, $strategy:ident => $body:expr) => {
        match $self {
            SelectionStrategies::Ucb1($strategy) => $body,
            SelectionStrategies::Ucb1Tuned($strategy) => $body,
            SelectionStrategies::Ucb1AlphaBeta($strategy) => $body,
            SelectionStrategies::Ag0($strategy) => $body,
            SelectionStrategies::NoisyAg0($strategy) => $body,
            SelectionStrategies::ExIt($strategy) => $body,
            SelectionStrategies::ProgressiveBias($strategy) => $body,
            SelectionStrategies::ProgressiveHistory($strategy) => $body,
            SelectionStrategies::McGrave($strategy) => $body,
            SelectionStrategies::Ucb1Grave($strategy) => $body,
            SelectionStrategies::McBrave($strategy) => $body,
            SelectionStrategies::RegPolOpt($strategy) => $body,
        }
    };
}

impl SelectionStrategies {
    /// Builds a strategy with its default options by (case-insensitive) name.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let strategy = match normalized.as_str() {
            "ucb1" => Self::Ucb1(Ucb1::default()),
            "ucb1tuned" => Self::Ucb1Tuned(Ucb1Tuned::default()),
            "ucb1alphabeta" | "ucb1withalphabetabounds" => {
                Self::Ucb1AlphaBeta(Ucb1AlphaBeta::default())
            }
            "ag0" | "ag0selection" | "pucb" => Self::Ag0(Ag0::default()),
            "noisyag0" | "noisyag0selection" => Self::NoisyAg0(NoisyAg0::default()),
            "exit" | "exitselection" => Self::ExIt(ExIt::default()),
            "progressivebias" => Self::ProgressiveBias(ProgressiveBias::default()),
            "progressivehistory" => Self::ProgressiveHistory(ProgressiveHistory::default()),
            "mcgrave" => Self::McGrave(McGrave::default()),
            "ucb1grave" => Self::Ucb1Grave(Ucb1Grave::default()),
            "mcbrave" => Self::McBrave(McBrave::default()),
            "regpolopt" | "searchregpolopt" => Self::RegPolOpt(RegPolOpt::default()),
            _ => bail!("Unknown selection strategy: {:?}", name),
        };

        Ok(strategy)
    }

    /// Parses `["NAME", "key=value", ...]` into a configured strategy.
    pub fn from_tokens(tokens: &[&str]) -> Result<Self> {
        let name = tokens
            .first()
            .ok_or_else(|| anyhow!("Selection strategy tokens are empty"))?;

        let mut strategy = Self::from_name(name)?;
        strategy.customise(tokens);
        Ok(strategy)
    }
}

impl Default for SelectionStrategies {
    fn default() -> Self {
        Self::Ucb1(Ucb1::default())
    }
}

impl SelectionStrategy for SelectionStrategies {
    fn name(&self) -> &'static str {
        dispatch!(self, s => s.name())
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        dispatch!(self, s => s.select(ctx, tree, node_id))
    }

    fn backprop_flags(&self) -> BackpropFlags {
        dispatch!(self, s => s.backprop_flags())
    }

    fn expansion_flags(&self) -> ExpansionFlags {
        dispatch!(self, s => s.expansion_flags())
    }

    fn customise(&mut self, inputs: &[&str]) {
        dispatch!(self, s => s.customise(inputs))
    }
}
