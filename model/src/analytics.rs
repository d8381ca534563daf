use engine::Value;

use crate::AlphaBetaBounds;

/// Supplies prior policies, value estimates and the other per-node inputs selection consumes.
pub trait Evaluator {
    type Action;
    type State;
    type Value: Value;

    fn get_state_analysis(
        &self,
        game_state: &Self::State,
        legal_actions: &[Self::Action],
        request: &AnalysisRequest,
    ) -> StateAnalysis<Self::Action, Self::Value>;
}

/// Optional parts of an analysis the caller needs. Producing them may be expensive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub heuristic_values: bool,
}

#[derive(Clone, Debug)]
pub struct StateAnalysis<A, V> {
    /// Prior probability of each legal action, in legal action order. Empty means uniform.
    pub policy_scores: Vec<f32>,
    /// Estimated outcome for every agent, backpropagated as the result of the visit.
    pub value_score: V,
    /// Stand-in exploitation score, from the perspective of the agent to move, for children
    /// that do not exist yet.
    pub unvisited_value_estimate: f64,
    /// Per-agent heuristic estimates. Present when requested.
    pub heuristic_values: Option<Vec<f64>>,
    /// Static bounds on the value of the state from the perspective of the agent to move.
    pub bounds: Option<AlphaBetaBounds>,
    /// Moves played beyond the state while producing `value_score`, if any.
    pub playout: Vec<PlayoutMove<A>>,
}

impl<A, V> StateAnalysis<A, V> {
    pub fn new(value_score: V, policy_scores: Vec<f32>) -> Self {
        Self {
            policy_scores,
            value_score,
            unvisited_value_estimate: 0.0,
            heuristic_values: None,
            bounds: None,
            playout: Vec::new(),
        }
    }

    pub fn with_unvisited_value_estimate(mut self, estimate: f64) -> Self {
        self.unvisited_value_estimate = estimate;
        self
    }

    pub fn with_heuristic_values(mut self, heuristic_values: Vec<f64>) -> Self {
        self.heuristic_values = Some(heuristic_values);
        self
    }

    pub fn with_bounds(mut self, bounds: AlphaBetaBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_playout(mut self, playout: Vec<PlayoutMove<A>>) -> Self {
        self.playout = playout;
        self
    }
}

/// A move made outside the tree, recorded with the ply it was made at and the agent who made it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayoutMove<A> {
    pub action: A,
    pub depth: usize,
    pub agent: usize,
}

impl<A> PlayoutMove<A> {
    pub fn new(action: A, depth: usize, agent: usize) -> Self {
        Self {
            action,
            depth,
            agent,
        }
    }
}
