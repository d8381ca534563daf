use super::value::Value;

/// Rules of the game being searched. Agents are numbered from `0`.
pub trait GameEngine {
    type Action;
    type State;
    type Value: Value;

    fn legal_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;
    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;
    fn agent_to_move(&self, game_state: &Self::State) -> usize;
    /// Number of moves played to reach `game_state`.
    fn move_number(&self, game_state: &Self::State) -> usize;
    fn num_agents(&self) -> usize;
    fn is_terminal_state(&self, game_state: &Self::State) -> Option<Self::Value>;
}
