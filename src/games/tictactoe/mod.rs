//! Tic-tac-toe board engine and AI move selector.

pub mod ai;
mod cell;
mod rules;
mod types;

pub use ai::Difficulty;
pub use cell::Cell;
pub use rules::{Outcome, check_winner, evaluate};
pub use types::{Board, Mark, Square};
