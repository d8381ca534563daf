pub mod backpropagation_strategy;
#[cfg(test)]
mod counting_game;
pub mod customise;
pub mod flags;
pub mod mcts;
#[cfg(test)]
mod mcts_tests;
pub mod move_key;
mod node;
pub mod node_statistics;
pub mod options;
pub mod search_context;
pub mod selection_strategy;
pub mod strategies;
pub mod tie_break;
mod tree;

pub use backpropagation_strategy::*;
pub use customise::{apply_overrides, Hyperparameters, OverrideResult};
pub use flags::*;
pub use mcts::*;
pub use move_key::*;
pub use node::*;
pub use node_statistics::*;
pub use options::*;
pub use search_context::*;
pub use selection_strategy::*;
pub use strategies::*;
pub use tie_break::*;
pub use tree::*;
