use std::sync::atomic::{AtomicU32, Ordering};

use common::AtomicF64;
use model::AlphaBetaBounds;

use crate::{MoveStatsTable, NodeId};

/// Everything needed to create a node, gathered from the rules and the evaluator.
#[derive(Clone, Debug)]
pub struct NodeInit<A> {
    pub legal_actions: Vec<A>,
    pub agent_to_move: usize,
    pub num_agents: usize,
    pub depth: usize,
    pub policy: Vec<f32>,
    pub heuristic_values: Option<Vec<f64>>,
    pub unvisited_value_estimate: f64,
    pub bounds: Option<AlphaBetaBounds>,
}

impl<A> NodeInit<A> {
    pub fn new(
        legal_actions: Vec<A>,
        agent_to_move: usize,
        num_agents: usize,
        depth: usize,
    ) -> Self {
        Self {
            legal_actions,
            agent_to_move,
            num_agents,
            depth,
            policy: Vec::new(),
            heuristic_values: None,
            unvisited_value_estimate: 0.0,
            bounds: None,
        }
    }

    pub fn with_policy(mut self, policy: Vec<f32>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_heuristic_values(mut self, heuristic_values: Vec<f64>) -> Self {
        self.heuristic_values = Some(heuristic_values);
        self
    }

    pub fn with_unvisited_value_estimate(mut self, estimate: f64) -> Self {
        self.unvisited_value_estimate = estimate;
        self
    }

    pub fn with_bounds(mut self, bounds: AlphaBetaBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// A node of the search tree.
///
/// Child slot `i` always belongs to legal action `i`; the set of legal actions never changes
/// after creation. Counters and scores are atomics so workers can read them while others
/// backpropagate. Readers may observe a visit without its score or vice versa.
#[derive(Debug)]
pub struct SearchNode<A> {
    parent: Option<(NodeId, usize)>,
    depth: usize,
    agent_to_move: usize,
    legal_actions: Box<[A]>,
    children: Box<[AtomicU32]>,
    visits: AtomicU32,
    virtual_visits: AtomicU32,
    total_scores: Box<[AtomicF64]>,
    sum_squared_scores: Box<[AtomicF64]>,
    policy: Box<[f32]>,
    heuristic_values: Option<Box<[f64]>>,
    unvisited_value_estimate: AtomicF64,
    bounds: Option<AlphaBetaBounds>,
    grave_stats: MoveStatsTable<A>,
}

impl<A> SearchNode<A> {
    /// `policy` must already be validated against the number of legal actions.
    pub(crate) fn new(init: NodeInit<A>, parent: Option<(NodeId, usize)>) -> Self {
        let num_legal_moves = init.legal_actions.len();
        let policy = if init.policy.is_empty() && num_legal_moves > 0 {
            vec![1.0 / num_legal_moves as f32; num_legal_moves]
        } else {
            init.policy
        };

        Self {
            parent,
            depth: init.depth,
            agent_to_move: init.agent_to_move,
            children: (0..num_legal_moves)
                .map(|_| AtomicU32::new(NodeId::unset().as_u32()))
                .collect(),
            legal_actions: init.legal_actions.into_boxed_slice(),
            visits: AtomicU32::new(0),
            virtual_visits: AtomicU32::new(0),
            total_scores: (0..init.num_agents).map(|_| AtomicF64::default()).collect(),
            sum_squared_scores: (0..init.num_agents).map(|_| AtomicF64::default()).collect(),
            policy: policy.into_boxed_slice(),
            heuristic_values: init.heuristic_values.map(Vec::into_boxed_slice),
            unvisited_value_estimate: AtomicF64::new(init.unvisited_value_estimate),
            bounds: init.bounds,
            grave_stats: MoveStatsTable::default(),
        }
    }

    pub fn num_legal_moves(&self) -> usize {
        self.legal_actions.len()
    }

    pub fn legal_actions(&self) -> &[A] {
        &self.legal_actions
    }

    pub fn legal_action(&self, index: usize) -> &A {
        &self.legal_actions[index]
    }

    pub fn child(&self, index: usize) -> Option<NodeId> {
        let node_id = NodeId::from_u32(self.children[index].load(Ordering::Acquire));
        if node_id.is_unset() {
            None
        } else {
            Some(node_id)
        }
    }

    /// Claims child slot `index`. On a lost race the winning child is returned as the error.
    pub(crate) fn try_set_child(&self, index: usize, child: NodeId) -> Result<(), NodeId> {
        self.children[index]
            .compare_exchange(
                NodeId::unset().as_u32(),
                child.as_u32(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(NodeId::from_u32)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.map(|(parent, _)| parent)
    }

    /// The parent and the index of the legal action that led here.
    pub fn parent_link(&self) -> Option<(NodeId, usize)> {
        self.parent
    }

    /// Number of moves played before this node's state.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn agent_to_move(&self) -> usize {
        self.agent_to_move
    }

    pub fn num_agents(&self) -> usize {
        self.total_scores.len()
    }

    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Acquire)
    }

    pub fn virtual_visits(&self) -> u32 {
        self.virtual_visits.load(Ordering::Acquire)
    }

    /// Real plus virtual visits. This is what the bandit formulas count.
    pub fn total_visits(&self) -> u32 {
        self.visits() + self.virtual_visits()
    }

    pub fn add_virtual_visit(&self) {
        self.virtual_visits.fetch_add(1, Ordering::AcqRel);
    }

    /// Commits one real visit with the given per-agent utilities and releases one virtual visit.
    pub fn update(&self, utilities: &[f64]) {
        for (agent, utility) in utilities.iter().enumerate().take(self.total_scores.len()) {
            self.total_scores[agent].fetch_add(*utility);
            self.sum_squared_scores[agent].fetch_add(utility * utility);
        }

        self.visits.fetch_add(1, Ordering::AcqRel);
        let _ = self
            .virtual_visits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                Some(v.saturating_sub(1))
            });
    }

    pub fn total_score(&self, agent: usize) -> f64 {
        self.total_scores
            .get(agent)
            .map_or(0.0, AtomicF64::load)
    }

    pub fn sum_squared_scores(&self, agent: usize) -> f64 {
        self.sum_squared_scores
            .get(agent)
            .map_or(0.0, AtomicF64::load)
    }

    /// Mean utility for `agent`, `0.0` while the node has no real visits.
    pub fn exploitation_score(&self, agent: usize) -> f64 {
        let visits = self.visits();
        if visits == 0 {
            0.0
        } else {
            self.total_score(agent) / visits as f64
        }
    }

    pub fn learned_selection_policy(&self) -> &[f32] {
        &self.policy
    }

    pub fn prior(&self, index: usize) -> f32 {
        self.policy[index]
    }

    pub fn heuristic_value_estimates(&self) -> Option<&[f64]> {
        self.heuristic_values.as_deref()
    }

    /// Exploitation score substituted for children that do not exist yet, from the
    /// perspective of the agent to move.
    pub fn unvisited_value_estimate(&self) -> f64 {
        self.unvisited_value_estimate.load()
    }

    pub fn set_unvisited_value_estimate(&self, estimate: f64) {
        self.unvisited_value_estimate.store(estimate);
    }

    pub fn bounds(&self) -> Option<&AlphaBetaBounds> {
        self.bounds.as_ref()
    }

    pub fn grave_stats(&self) -> &MoveStatsTable<A> {
        &self.grave_stats
    }
}
