use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ucb1_exploration, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, BackpropFlags, MoveKey, NodeId, SearchAction, SearchContext, SearchTree,
    SelectionStrategy,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveHistoryOptions {
    pub exploration_constant: f64,
    pub progressive_history_weight: f64,
}

impl Default for ProgressiveHistoryOptions {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            progressive_history_weight: 3.0,
        }
    }
}

impl Hyperparameters for ProgressiveHistoryOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            "progressivehistoryweight" => set_f64(&mut self.progressive_history_weight, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// UCB1 plus `h·W/((1 - q)·n + 1)`, where `h` is the tree-wide mean of the move.
#[derive(Clone, Debug, Default)]
pub struct ProgressiveHistory {
    options: ProgressiveHistoryOptions,
}

impl ProgressiveHistory {
    pub fn new(options: ProgressiveHistoryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProgressiveHistoryOptions {
        &self.options
    }
}

impl SelectionStrategy for ProgressiveHistory {
    fn name(&self) -> &'static str {
        "ProgressiveHistory"
    }

    fn select<A: SearchAction>(
        &self,
        ctx: &mut SearchContext,
        tree: &SearchTree<A>,
        node_id: NodeId,
    ) -> Result<usize> {
        let node = tree.node(node_id);
        ensure_legal_moves(self.name(), node)?;

        let parent_log = parent_log_visits(tree, node_id);
        let weight = self.options.progressive_history_weight;
        let mut best = BestChild::new();

        for i in 0..node.num_legal_moves() {
            let child = ChildSnapshot::read(tree, node, i);
            let global_mean = tree
                .global_stats()
                .get(&MoveKey::depth_agnostic(node.legal_action(i).clone()))
                .and_then(|stats| stats.mean())
                .unwrap_or(0.0);

            // Score and visit count are updated separately, so a concurrent read can see a
            // mean outside [-1, 1].
            let exploit = child.exploit.clamp(-1.0, 1.0);
            let history = global_mean * weight / ((1.0 - exploit) * child.visits as f64 + 1.0);
            let value = child.exploit
                + self.options.exploration_constant
                    * ucb1_exploration(parent_log, child.visits_or_one())
                + history;
            best.offer(i, value, ctx.rng());
        }

        Ok(best.index())
    }

    fn backprop_flags(&self) -> BackpropFlags {
        BackpropFlags::GLOBAL_ACTION_STATS
    }

    fn customise(&mut self, inputs: &[&str]) {
        apply_overrides(self.name(), &mut self.options, inputs);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_without_history_matches_ucb1() {
        let tree = fixture(&[10, 5, 0], &[0.2, 0.5, 0.0], 0.1);
        let strategy = ProgressiveHistory::new(ProgressiveHistoryOptions {
            exploration_constant: 1.41,
            ..Default::default()
        });

        assert_eq!(selection_counts(&strategy, &tree, 0, 20), vec![0, 0, 20]);
    }

    #[test]
    fn test_global_history_breaks_ties() {
        let tree = fixture(&[0, 0, 0], &[0.0; 3], 0.0);
        tree.global_stats().record(MoveKey::depth_agnostic(1), 0.8);
        tree.global_stats().record(MoveKey::depth_agnostic(2), -0.4);

        assert_eq!(
            selection_counts(&ProgressiveHistory::default(), &tree, 0, 20),
            vec![0, 20, 0]
        );
    }

    #[test]
    fn test_history_decays_with_visits() {
        let tree = fixture(&[2, 10], &[0.1, 0.2], 0.0);
        tree.global_stats().record(MoveKey::depth_agnostic(0), 0.5);
        tree.global_stats().record(MoveKey::depth_agnostic(1), 0.5);
        let strategy = ProgressiveHistory::new(ProgressiveHistoryOptions {
            exploration_constant: 0.0,
            ..Default::default()
        });

        // 0.1 + 1.5/(0.9·2 + 1) = 0.636 against 0.2 + 1.5/(0.8·10 + 1) = 0.367.
        assert_eq!(selection_counts(&strategy, &tree, 0, 20), vec![20, 0]);
    }

    #[test]
    fn test_torn_mean_keeps_history_sign() {
        // A mean above 1 is what a reader sees between a score update and its visit count.
        let tree = fixture(&[2, 2], &[1.6, 0.0], 0.0);
        tree.global_stats().record(MoveKey::depth_agnostic(0), 0.5);
        let strategy = ProgressiveHistory::new(ProgressiveHistoryOptions {
            exploration_constant: 0.0,
            ..Default::default()
        });

        // The mean is clamped to 1 in the decay: 1.6 + 1.5/1 against 0.
        assert_eq!(selection_counts(&strategy, &tree, 0, 20), vec![20, 0]);
    }

    #[test]
    fn test_depth_keyed_entries_are_ignored() {
        let tree = fixture(&[0, 0], &[0.0; 2], 0.0);
        tree.global_stats().record(MoveKey::new(1, 0), 1.0);

        let counts = selection_counts(&ProgressiveHistory::default(), &tree, 0, 2000);
        assert!(counts[0] > 800 && counts[1] > 800, "{:?}", counts);
    }

    #[test]
    fn test_requests_global_stats() {
        assert_eq!(
            ProgressiveHistory::default().backprop_flags(),
            BackpropFlags::GLOBAL_ACTION_STATS
        );
    }
}
