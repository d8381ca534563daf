use crate::tie_break::BestChild;
use crate::{MoveKey, NodeId, NodeStatistics, SearchAction, SearchContext, SearchTree};

use super::{parent_log_visits, ucb1_exploration, ChildSnapshot};

/// Weight given to the AMAF mean: `g/(g + c + bias·g·c)`.
///
/// `g` is the AMAF visit count and `c` the child's visit count. No AMAF evidence, or a
/// degenerate denominator, gives `0`.
pub fn grave_beta(grave_visits: f64, child_visits: f64, bias: f64) -> f64 {
    if grave_visits <= 0.0 {
        return 0.0;
    }

    let denominator = grave_visits + child_visits + bias * grave_visits * child_visits;
    if denominator > 0.0 {
        grave_visits / denominator
    } else {
        0.0
    }
}

/// `(1 - β)·mean + β·amafMean`, or the plain mean without AMAF evidence.
pub(crate) fn blend_with_amaf(
    mean: f64,
    child_visits: u32,
    amaf: Option<NodeStatistics>,
    bias: f64,
) -> f64 {
    match amaf.and_then(|stats| stats.mean().map(|amaf_mean| (amaf_mean, stats.visit_count))) {
        Some((amaf_mean, grave_visits)) => {
            let beta = grave_beta(grave_visits as f64, child_visits as f64, bias);
            (1.0 - beta) * mean + beta * amaf_mean
        }
        None => mean,
    }
}

/// Re-anchors the worker's reference ancestor at `node_id` when none is set, at the root, or
/// once `node_id` has more than `ref_visits` visits. Returns the ancestor to read.
pub(crate) fn update_reference<A: SearchAction>(
    ctx: &mut SearchContext,
    tree: &SearchTree<A>,
    node_id: NodeId,
    ref_visits: u32,
) -> NodeId {
    match ctx.grave_reference() {
        Some(reference)
            if !tree.is_root(node_id) && tree.node(node_id).visits() <= ref_visits =>
        {
            reference
        }
        _ => {
            ctx.set_grave_reference(Some(node_id));
            node_id
        }
    }
}

/// Shared body of MC-GRAVE and UCB1-GRAVE. `exploration_constant` of `None` drops the UCB1 term.
pub(crate) fn select_grave<A: SearchAction>(
    ctx: &mut SearchContext,
    tree: &SearchTree<A>,
    node_id: NodeId,
    ref_visits: u32,
    bias: f64,
    exploration_constant: Option<f64>,
) -> usize {
    let node = tree.node(node_id);
    let reference = update_reference(ctx, tree, node_id, ref_visits);
    let amaf_table = tree.node(reference).grave_stats();
    let parent_log = exploration_constant.map(|_| parent_log_visits(tree, node_id));
    let mut best = BestChild::new();

    for i in 0..node.num_legal_moves() {
        let child = ChildSnapshot::read(tree, node, i);
        let amaf = amaf_table.get(&MoveKey::new(node.legal_action(i).clone(), node.depth()));
        let mut value = blend_with_amaf(child.exploit, child.visits, amaf, bias);

        if let (Some(c), Some(parent_log)) = (exploration_constant, parent_log) {
            value += c * ucb1_exploration(parent_log, child.visits_or_one());
        }

        best.offer(i, value, ctx.rng());
    }

    let index = best.index();
    if node.child(index).is_none() {
        ctx.set_grave_reference(None);
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_beta_without_evidence_is_zero() {
        assert_eq!(grave_beta(0.0, 10.0, 1e-5), 0.0);
        assert_eq!(grave_beta(0.0, 0.0, 1e-5), 0.0);
    }

    #[test]
    fn test_beta_limits() {
        let (g, c) = (40.0, 10.0);

        assert_approx_eq!(grave_beta(g, c, 1e-12), g / (g + c), 1e-9);
        assert!(grave_beta(g, c, 1e12) < 1e-9);
        assert!(grave_beta(g, c, 1.0) < grave_beta(g, c, 0.01));
    }

    #[test]
    fn test_beta_is_one_for_unvisited_child() {
        assert_approx_eq!(grave_beta(5.0, 0.0, 1e-5), 1.0);
    }

    #[test]
    fn test_blend() {
        let amaf = NodeStatistics::new(3.0, 4);
        let beta = grave_beta(4.0, 4.0, 0.0);

        assert_approx_eq!(blend_with_amaf(0.25, 4, Some(amaf), 0.0), 0.5 * 0.25 + beta * 0.75);
        assert_approx_eq!(blend_with_amaf(0.25, 4, None, 0.0), 0.25);
        assert_approx_eq!(
            blend_with_amaf(0.25, 4, Some(NodeStatistics::default()), 0.0),
            0.25
        );
    }
}
