use model::AlphaBetaBounds;

use crate::{MoveKey, NodeId, NodeInit, SearchTree};

/// A two agent tree whose root (agent `0` to move) has one legal action per entry of `visits`.
///
/// Child `i` is created when `visits[i] > 0` and receives that many visits scoring
/// `exploit[i]` for agent `0`. Children carry neutral heuristic estimates and the root carries
/// `[-1, 1]` bounds so every strategy has the inputs it consumes.
pub(crate) fn fixture(visits: &[u32], exploit: &[f64], unvisited: f64) -> SearchTree<usize> {
    fixture_with_policy(visits, exploit, unvisited, Vec::new())
}

pub(crate) fn fixture_with_policy(
    visits: &[u32],
    exploit: &[f64],
    unvisited: f64,
    policy: Vec<f32>,
) -> SearchTree<usize> {
    let root = NodeInit::new((0..visits.len()).collect(), 0, 2, 0)
        .with_policy(policy)
        .with_unvisited_value_estimate(unvisited)
        .with_bounds(AlphaBetaBounds::new(-1.0, 1.0));
    let tree = SearchTree::new(root).unwrap();

    for (i, (&n, &q)) in visits.iter().zip(exploit).enumerate() {
        if n > 0 {
            let child = add_child(&tree, tree.root(), i);
            for _ in 0..n {
                tree.node(child).update(&[q, -q]);
            }
        }
    }

    tree
}

/// Expands `parent`'s slot `index` with a two-action node whose heuristics are neutral.
pub(crate) fn add_child(tree: &SearchTree<usize>, parent: NodeId, index: usize) -> NodeId {
    let parent_node = tree.node(parent);
    let init = NodeInit::new(
        vec![0, 1],
        1 - parent_node.agent_to_move(),
        2,
        parent_node.depth() + 1,
    )
    .with_heuristic_values(vec![0.0, 0.0]);

    tree.add_child(parent, index, init).unwrap()
}

/// A root with one visited child whose two moves have no children yet.
///
/// The root's AMAF table favours the child's move `1` and the child's own table favours move
/// `0`, so a GRAVE selection at the child reveals which table it read.
pub(crate) fn conflicting_amaf_tables(child_visits: u32) -> (SearchTree<usize>, NodeId) {
    let tree = fixture(&[child_visits, 0], &[0.5, 0.0], -1.0);
    let child = tree.child(tree.root(), 0).unwrap();
    let depth = tree.node(child).depth();

    let root_table = tree.root_node().grave_stats();
    root_table.record(MoveKey::new(0, depth), -0.8);
    root_table.record(MoveKey::new(1, depth), 0.8);

    let child_table = tree.node(child).grave_stats();
    child_table.record(MoveKey::new(0, depth), 0.8);
    child_table.record(MoveKey::new(1, depth), -0.8);

    (tree, child)
}

/// Selection frequencies over `trials` calls, with the context cleared between calls.
pub(crate) fn selection_counts<S: crate::SelectionStrategy>(
    strategy: &S,
    tree: &SearchTree<usize>,
    seed: u64,
    trials: usize,
) -> Vec<usize> {
    let mut ctx = crate::SearchContext::from_seed(seed, 0);
    let mut counts = vec![0; tree.root_node().num_legal_moves()];

    for _ in 0..trials {
        ctx.clear();
        counts[strategy.select(&mut ctx, tree, tree.root()).unwrap()] += 1;
    }

    counts
}
