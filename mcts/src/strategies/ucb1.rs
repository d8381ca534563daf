use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ucb1_exploration, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ucb1Options {
    pub exploration_constant: f64,
}

impl Default for Ucb1Options {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
        }
    }
}

impl Hyperparameters for Ucb1Options {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// `q + C·sqrt(ln(max(1, Σn)) / max(1, n))`
#[derive(Clone, Debug, Default)]
pub struct Ucb1 {
    options: Ucb1Options,
}

impl Ucb1 {
    pub fn new(options: Ucb1Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Ucb1Options {
        &self.options
    }
}

impl SelectionStrategy for Ucb1 {
    fn name(&self) -> &'static str {
        "UCB1"
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
        let mut best = BestChild::new();

        for i in 0..node.num_legal_moves() {
            let child = ChildSnapshot::read(tree, node, i);
            let value = child.exploit
                + self.options.exploration_constant
                    * ucb1_exploration(parent_log, child.visits_or_one());
            best.offer(i, value, ctx.rng());
        }

        Ok(best.index())
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
    fn test_picks_ucb1_argmax() {
        // 0.934, 1.538, 2.420
        let tree = fixture(&[10, 5, 0], &[0.2, 0.5, 0.0], 0.1);
        let strategy = Ucb1::new(Ucb1Options {
            exploration_constant: 1.41,
        });

        assert_eq!(selection_counts(&strategy, &tree, 0, 50), vec![0, 0, 50]);
    }

    #[test]
    fn test_zero_exploration_takes_dominant_child() {
        let tree = fixture(&[4, 4, 4], &[0.1, 0.6, 0.3], 0.0);
        let strategy = Ucb1::new(Ucb1Options {
            exploration_constant: 0.0,
        });

        assert_eq!(selection_counts(&strategy, &tree, 1, 50), vec![0, 50, 0]);
    }

    #[test]
    fn test_virtual_visits_push_workers_apart() {
        let tree = fixture(&[3, 3], &[0.5, 0.5], 0.0);
        let first = tree.child(tree.root(), 0).unwrap();
        for _ in 0..3 {
            tree.node(first).add_virtual_visit();
        }

        assert_eq!(selection_counts(&Ucb1::default(), &tree, 2, 50), vec![0, 50]);
    }

    #[test]
    fn test_customise_sets_constant() {
        let mut strategy = Ucb1::default();
        strategy.customise(&["UCB1", "explorationconstant=3.0"]);

        assert_eq!(strategy.options().exploration_constant, 3.0);
    }

    #[test]
    fn test_customise_ignores_unknown_keys() {
        let mut strategy = Ucb1::default();
        strategy.customise(&["UCB1", "priorweight=3.0", "explorationconstant"]);

        assert_eq!(strategy.options(), &Ucb1Options::default());
    }
}
