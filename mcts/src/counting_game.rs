use engine::GameEngine;
use model::{AlphaBetaBounds, AnalysisRequest, Evaluator, StateAnalysis};

pub const START: i32 = 5;
pub const TARGET: i32 = 10;
pub const MAX_MOVES: usize = 40;

/// Agent `0` wins by counting up to `TARGET`, agent `1` by counting down to `0`.
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct CountingGameState {
    pub count: i32,
    pub move_number: usize,
}

impl CountingGameState {
    pub fn from_count(count: i32) -> Self {
        Self {
            count,
            move_number: 0,
        }
    }

    pub fn is_terminal_state(&self) -> Option<Vec<f64>> {
        if self.count >= TARGET {
            Some(vec![1.0, -1.0])
        } else if self.count <= 0 {
            Some(vec![-1.0, 1.0])
        } else if self.move_number >= MAX_MOVES {
            Some(vec![0.0, 0.0])
        } else {
            None
        }
    }

    pub fn initial() -> Self {
        Self::from_count(START)
    }

    /// Linear estimate of the position for agent `0`.
    pub fn estimate(&self) -> f64 {
        (self.count - START) as f64 / START as f64
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum CountingAction {
    Increment,
    Decrement,
    Stay,
}

pub struct CountingGameEngine {}

impl CountingGameEngine {
    pub fn new() -> Self {
        Self {}
    }
}

impl GameEngine for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;
    type Value = Vec<f64>;

    fn legal_actions(&self, _game_state: &Self::State) -> Vec<Self::Action> {
        vec![
            CountingAction::Increment,
            CountingAction::Decrement,
            CountingAction::Stay,
        ]
    }

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let count = match action {
            CountingAction::Increment => game_state.count + 1,
            CountingAction::Decrement => game_state.count - 1,
            CountingAction::Stay => game_state.count,
        };

        Self::State {
            count,
            move_number: game_state.move_number + 1,
        }
    }

    fn agent_to_move(&self, game_state: &Self::State) -> usize {
        game_state.move_number % 2
    }

    fn move_number(&self, game_state: &Self::State) -> usize {
        game_state.move_number
    }

    fn num_agents(&self) -> usize {
        2
    }

    fn is_terminal_state(&self, game_state: &Self::State) -> Option<Self::Value> {
        game_state.is_terminal_state()
    }
}

pub struct CountingAnalyzer {}

impl CountingAnalyzer {
    pub fn new() -> Self {
        Self {}
    }
}

impl Evaluator for CountingAnalyzer {
    type Action = CountingAction;
    type State = CountingGameState;
    type Value = Vec<f64>;

    fn get_state_analysis(
        &self,
        game_state: &Self::State,
        _legal_actions: &[Self::Action],
        request: &AnalysisRequest,
    ) -> StateAnalysis<Self::Action, Self::Value> {
        let value = game_state.estimate();
        let analysis = StateAnalysis::new(vec![value, -value], vec![0.3, 0.3, 0.4])
            .with_bounds(AlphaBetaBounds::new(-1.0, 1.0));

        if request.heuristic_values {
            analysis.with_heuristic_values(vec![value, -value])
        } else {
            analysis
        }
    }
}
