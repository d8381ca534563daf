use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ensure_legal_moves, parent_log_visits, ucb1_exploration, ChildSnapshot};
use crate::customise::{apply_overrides, set_f64, Hyperparameters, OverrideResult};
use crate::{
    tie_break::BestChild, NodeId, SearchAction, SearchContext, SearchTree, SelectionStrategy,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExItOptions {
    pub exploration_constant: f64,
    pub prior_weight: f64,
}

impl Default for ExItOptions {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            prior_weight: 1.0,
        }
    }
}

impl Hyperparameters for ExItOptions {
    fn set(&mut self, key: &str, value: &str) -> OverrideResult {
        match key {
            "explorationconstant" => set_f64(&mut self.exploration_constant, value),
            "priorweight" => set_f64(&mut self.prior_weight, value),
            _ => OverrideResult::UnknownKey,
        }
    }
}

/// Expert Iteration selection: UCB1 plus `w·P(a)/(n + 1)`.
#[derive(Clone, Debug, Default)]
pub struct ExIt {
    options: ExItOptions,
}

impl ExIt {
    pub fn new(options: ExItOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExItOptions {
        &self.options
    }
}

impl SelectionStrategy for ExIt {
    fn name(&self) -> &'static str {
        "ExIt"
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
            let explore = self.options.exploration_constant
                * ucb1_exploration(parent_log, child.visits_or_one());
            let prior =
                self.options.prior_weight * node.prior(i) as f64 / (child.visits as f64 + 1.0);
            best.offer(i, child.exploit + explore + prior, ctx.rng());
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
    fn test_prior_breaks_symmetry() {
        let tree = fixture_with_policy(&[0, 0, 0], &[0.0; 3], 0.0, vec![0.2, 0.2, 0.6]);

        assert_eq!(selection_counts(&ExIt::default(), &tree, 0, 20), vec![0, 0, 20]);
    }

    #[test]
    fn test_prior_weight_zero_is_ucb1() {
        let tree = fixture_with_policy(&[10, 5, 0], &[0.2, 0.5, 0.0], 0.1, vec![0.9, 0.05, 0.05]);
        let strategy = ExIt::new(ExItOptions {
            exploration_constant: 1.41,
            prior_weight: 0.0,
        });

        assert_eq!(selection_counts(&strategy, &tree, 0, 20), vec![0, 0, 20]);
    }

    #[test]
    fn test_prior_decays_with_visits() {
        let tree = fixture_with_policy(&[1, 9], &[0.0, 0.1], 0.0, vec![0.4, 0.6]);
        let strategy = ExIt::new(ExItOptions {
            exploration_constant: 0.0,
            prior_weight: 1.0,
        });

        // 0 + 0.4/2 = 0.2 against 0.1 + 0.6/10 = 0.16.
        assert_eq!(selection_counts(&strategy, &tree, 0, 20), vec![20, 0]);
    }

    #[test]
    fn test_customise_both_keys() {
        let mut strategy = ExIt::default();
        strategy.customise(&["ExIt", "priorweight=2", "explorationconstant=0.5"]);

        assert_eq!(strategy.options().prior_weight, 2.0);
        assert_eq!(strategy.options().exploration_constant, 0.5);
    }
}
