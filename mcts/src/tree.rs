use anyhow::{bail, Result};
use append_only_vec::AppendOnlyVec;
use model::{EdgeMetrics, NodeMetrics};

use crate::{MoveStatsTable, NodeInit, SearchAction, SearchNode};

#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn from_u32(i: u32) -> Self {
        Self(i)
    }

    #[inline]
    pub(crate) fn unset() -> Self {
        Self(u32::MAX)
    }

    #[inline]
    pub(crate) fn is_unset(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Arena owning every node of one search.
///
/// Nodes are never removed while the tree lives; ids stay valid and references handed out by
/// [`SearchTree::node`] remain stable while other workers append.
pub struct SearchTree<A> {
    nodes: AppendOnlyVec<SearchNode<A>>,
    global_stats: MoveStatsTable<A>,
    root: NodeId,
}

impl<A> SearchTree<A>
where
    A: SearchAction,
{
    pub fn new(root: NodeInit<A>) -> Result<Self> {
        validate(&root)?;

        let nodes = AppendOnlyVec::new();
        let root_index = nodes.push(SearchNode::new(root, None));

        Ok(Self {
            nodes,
            global_stats: MoveStatsTable::default(),
            root: NodeId::from_u32(root_index as u32),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &SearchNode<A> {
        self.node(self.root)
    }

    pub fn is_root(&self, node_id: NodeId) -> bool {
        node_id == self.root
    }

    #[inline]
    pub fn node(&self, node_id: NodeId) -> &SearchNode<A> {
        &self.nodes[node_id.as_u32() as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id).parent()
    }

    pub fn child(&self, node_id: NodeId, index: usize) -> Option<NodeId> {
        self.node(node_id).child(index)
    }

    /// Creates the child reached by legal action `index` of `parent`.
    ///
    /// When another worker expanded the same slot first, the freshly pushed node is left
    /// unreferenced and the winner's id is returned.
    pub fn add_child(&self, parent: NodeId, index: usize, init: NodeInit<A>) -> Result<NodeId> {
        let parent_node = self.node(parent);
        if index >= parent_node.num_legal_moves() {
            bail!(
                "Child index {} is out of range for a node with {} legal moves",
                index,
                parent_node.num_legal_moves()
            );
        }

        if let Some(existing) = parent_node.child(index) {
            return Ok(existing);
        }

        validate(&init)?;

        let pushed = self.nodes.push(SearchNode::new(init, Some((parent, index))));
        if pushed >= u32::MAX as usize {
            bail!("Search tree exceeded {} nodes", u32::MAX - 1);
        }

        let child_id = NodeId::from_u32(pushed as u32);
        match parent_node.try_set_child(index, child_id) {
            Ok(()) => Ok(child_id),
            Err(winner) => Ok(winner),
        }
    }

    /// Sum of real plus virtual visits over the children that exist.
    pub fn sum_legal_child_visits(&self, node_id: NodeId) -> u64 {
        let node = self.node(node_id);
        (0..node.num_legal_moves())
            .filter_map(|i| node.child(i))
            .map(|child| self.node(child).total_visits() as u64)
            .sum()
    }

    /// Depth-agnostic move statistics pooled over the whole search.
    pub fn global_stats(&self) -> &MoveStatsTable<A> {
        &self.global_stats
    }

    pub fn node_metrics(&self, node_id: NodeId) -> NodeMetrics<A> {
        let node = self.node(node_id);
        let agent = node.agent_to_move();

        let children = node
            .legal_actions()
            .iter()
            .enumerate()
            .map(|(i, action)| match node.child(i) {
                Some(child) => {
                    let child = self.node(child);
                    EdgeMetrics::new(
                        action.clone(),
                        child.visits() as usize,
                        child.exploitation_score(agent),
                    )
                }
                None => EdgeMetrics::new(action.clone(), 0, 0.0),
            })
            .collect();

        NodeMetrics {
            visits: node.visits() as usize,
            children,
        }
    }

    pub fn root_metrics(&self) -> NodeMetrics<A> {
        self.node_metrics(self.root)
    }

    /// The most visited root action, earliest legal action on ties.
    pub fn best_action(&self) -> Option<A> {
        self.root_metrics()
            .child_max_visits()
            .map(|edge| edge.action().clone())
    }

    /// Number of plies below the root of the deepest node created so far.
    pub fn max_depth(&self) -> usize {
        let root_depth = self.root_node().depth();
        self.nodes
            .iter()
            .map(|node| node.depth().saturating_sub(root_depth))
            .max()
            .unwrap_or(0)
    }
}

fn validate<A>(init: &NodeInit<A>) -> Result<()> {
    let num_legal_moves = init.legal_actions.len();

    if !init.policy.is_empty() && init.policy.len() != num_legal_moves {
        bail!(
            "Policy has {} entries but the node has {} legal moves",
            init.policy.len(),
            num_legal_moves
        );
    }

    if let Some(heuristic_values) = &init.heuristic_values {
        if heuristic_values.len() != init.num_agents {
            bail!(
                "Heuristic estimates have {} entries but the game has {} agents",
                heuristic_values.len(),
                init.num_agents
            );
        }
    }

    if init.agent_to_move >= init.num_agents.max(1) {
        bail!(
            "Agent to move {} is out of range for {} agents",
            init.agent_to_move,
            init.num_agents
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn root_init() -> NodeInit<char> {
        NodeInit::new(vec!['a', 'b', 'c'], 0, 2, 0)
    }

    #[test]
    fn test_new_tree_has_unexpanded_root() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root_node();

        assert_eq!(tree.len(), 1);
        assert!(tree.is_root(tree.root()));
        assert_eq!(root.num_legal_moves(), 3);
        assert!((0..3).all(|i| root.child(i).is_none()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_empty_policy_is_uniform() {
        let tree = SearchTree::new(root_init()).unwrap();

        for p in tree.root_node().learned_selection_policy() {
            assert_approx_eq!(*p, 1.0 / 3.0);
        }
    }

    #[test]
    fn test_rejects_mismatched_policy() {
        let init = root_init().with_policy(vec![0.5, 0.5]);

        assert!(SearchTree::new(init).is_err());
    }

    #[test]
    fn test_rejects_mismatched_heuristics() {
        let init = root_init().with_heuristic_values(vec![0.0]);

        assert!(SearchTree::new(init).is_err());
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root();
        let child = tree
            .add_child(root, 1, NodeInit::new(vec!['x'], 1, 2, 1))
            .unwrap();

        assert_eq!(tree.child(root, 1), Some(child));
        assert_eq!(tree.node(child).parent_link(), Some((root, 1)));
        assert_eq!(tree.node(child).depth(), 1);
        assert_eq!(tree.max_depth(), 1);
    }

    #[test]
    fn test_add_child_twice_returns_existing() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root();
        let first = tree.add_child(root, 0, NodeInit::new(vec![], 1, 2, 1)).unwrap();
        let second = tree.add_child(root, 0, NodeInit::new(vec![], 1, 2, 1)).unwrap();

        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_add_child_out_of_range() {
        let tree = SearchTree::new(root_init()).unwrap();

        assert!(tree
            .add_child(tree.root(), 3, NodeInit::new(vec![], 1, 2, 1))
            .is_err());
    }

    #[test]
    fn test_concurrent_expansion_has_single_winner() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root();

        let ids = std::thread::scope(|s| {
            let handles = (0..8)
                .map(|_| s.spawn(|| tree.add_child(root, 2, NodeInit::new(vec![], 1, 2, 1))))
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect::<Vec<_>>()
        });

        let winner = tree.child(root, 2).unwrap();
        assert!(ids.iter().all(|id| *id == winner));
    }

    #[test]
    fn test_sum_legal_child_visits_counts_virtual() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root();
        let a = tree.add_child(root, 0, NodeInit::new(vec![], 1, 2, 1)).unwrap();
        let b = tree.add_child(root, 2, NodeInit::new(vec![], 1, 2, 1)).unwrap();

        tree.node(a).add_virtual_visit();
        tree.node(a).update(&[1.0, -1.0]);
        tree.node(a).add_virtual_visit();
        tree.node(b).add_virtual_visit();

        assert_eq!(tree.sum_legal_child_visits(root), 3);
    }

    #[test]
    fn test_metrics_and_best_action() {
        let tree = SearchTree::new(root_init()).unwrap();
        let root = tree.root();
        let a = tree.add_child(root, 0, NodeInit::new(vec![], 1, 2, 1)).unwrap();
        let c = tree.add_child(root, 2, NodeInit::new(vec![], 1, 2, 1)).unwrap();

        tree.node(a).update(&[1.0, -1.0]);
        tree.node(c).update(&[1.0, -1.0]);
        tree.node(c).update(&[0.0, 0.0]);

        let metrics = tree.root_metrics();
        assert_eq!(metrics.children.len(), 3);
        assert_eq!(metrics.children[1].visits(), 0);
        assert_eq!(metrics.children[2].visits(), 2);
        assert_approx_eq!(metrics.children[2].value(), 0.5);
        assert_eq!(tree.best_action(), Some('c'));
    }
}
