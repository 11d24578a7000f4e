#![allow(clippy::inconsistent_digit_grouping)]
#![allow(clippy::unusual_byte_groupings)]

pub mod action;
pub mod engine;
pub mod game_state;

mod board;

use board::*;

pub use action::*;
pub use engine::*;
pub use game_state::*;

/// Two planes of 6x7 cells.
pub const INPUT_SIZE: usize = 2 * 6 * 7;
/// One action per column.
pub const ACTION_SPACE_SIZE: usize = 7;
