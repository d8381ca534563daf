use model::PlayoutMove;

use crate::{BackpropFlags, MoveKey, NodeId, SearchAction, SearchTree};

/// Commits the outcome of one simulation to the path that produced it.
pub trait BackpropagationStrategy {
    /// Walks from `leaf` to the root of `tree`. `utilities` holds one entry per agent and
    /// `playout` the moves simulated beyond `leaf`, if any.
    fn update<A: SearchAction>(
        &self,
        tree: &SearchTree<A>,
        leaf: NodeId,
        playout: &[PlayoutMove<A>],
        utilities: &[f64],
    );
}

/// Monte Carlo averaging, plus the optional AMAF tables selected by `flags`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonteCarloBackpropagation {
    flags: BackpropFlags,
}

impl MonteCarloBackpropagation {
    pub fn new(flags: BackpropFlags) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> BackpropFlags {
        self.flags
    }
}

impl BackpropagationStrategy for MonteCarloBackpropagation {
    fn update<A: SearchAction>(
        &self,
        tree: &SearchTree<A>,
        leaf: NodeId,
        playout: &[PlayoutMove<A>],
        utilities: &[f64],
    ) {
        let grave = self.flags.contains(BackpropFlags::GRAVE_STATS);
        let global = self.flags.contains(BackpropFlags::GLOBAL_ACTION_STATS);
        let utility = |agent: usize| utilities.get(agent).copied().unwrap_or(0.0);

        // Moves made from each node downwards, with the agent who made them.
        let mut amaf_moves = Vec::new();
        let mut global_moves = Vec::new();

        for m in playout {
            if grave {
                amaf_moves.push((MoveKey::new(m.action.clone(), m.depth), m.agent));
            }
            if global {
                global_moves.push((MoveKey::depth_agnostic(m.action.clone()), m.agent));
            }
        }

        let mut current = Some(leaf);
        while let Some(node_id) = current {
            let node = tree.node(node_id);
            node.update(utilities);

            if grave && !amaf_moves.is_empty() {
                node.grave_stats()
                    .record_all(amaf_moves.iter().map(|(key, agent)| (key, utility(*agent))));
            }

            if let Some((parent_id, index)) = node.parent_link() {
                let parent = tree.node(parent_id);
                let action = parent.legal_action(index);
                let mover = parent.agent_to_move();

                if grave {
                    amaf_moves.push((MoveKey::new(action.clone(), parent.depth()), mover));
                }
                if global {
                    global_moves.push((MoveKey::depth_agnostic(action.clone()), mover));
                }
            }

            current = node.parent();
        }

        if !global_moves.is_empty() {
            tree.global_stats()
                .record_all(global_moves.iter().map(|(key, agent)| (key, utility(*agent))));
        }
    }
}
