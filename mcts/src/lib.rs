#[cfg(test)]
mod counting_game;
pub mod mcts;
#[cfg(test)]
mod mcts_tests;
mod node;
pub mod options;
mod tree;

pub use mcts::*;
pub use node::*;
pub use options::*;
pub use tree::*;
