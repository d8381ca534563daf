use anyhow::Result;

use crate::{BackpropFlags, ExpansionFlags, NodeId, SearchAction, SearchContext, SearchTree};

/// Chooses which legal move to follow at a node during the descent from the root.
pub trait SelectionStrategy: Send + Sync {
    /// Canonical name, as used in logs and token lists.
    fn name(&self) -> &'static str;

    /// Returns an index in `[0, num_legal_moves)` of `node_id`.
    ///
    /// Errors only for wiring mistakes, such as a node without the inputs the strategy
    /// consumes, or a node with no legal moves.
    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize>;

    /// Extra statistics backpropagation must maintain for this strategy.
    fn backprop_flags(&self) -> BackpropFlags {
        BackpropFlags::NONE
    }

    /// Extra per-node inputs expansion must provide for this strategy.
    fn expansion_flags(&self) -> ExpansionFlags {
        ExpansionFlags::NONE
    }

    /// Applies `key=value` overrides. Unusable tokens are logged and ignored.
    fn customise(&mut self, inputs: &[&str]);
}
