//! Win and draw detection for tic-tac-toe.

use super::types::{Board, Mark, Square};
use serde::{Deserialize, Serialize};

/// Terminal classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Game is undecided.
    Ongoing,
    /// The given mark completed a line.
    Win(Mark),
    /// Board is full with no completed line.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win(mark) => Some(*mark),
            _ => None,
        }
    }

    /// Returns true if the game is decided.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ongoing => write!(f, "ongoing"),
            Outcome::Win(mark) => write!(f, "{mark} wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark holding a completed line, if any.
pub fn check_winner(board: &Board) -> Option<Mark> {
    let squares = board.squares();
    for [a, b, c] in LINES {
        if let Square::Occupied(mark) = squares[a]
            && squares[a] == squares[b]
            && squares[b] == squares[c]
        {
            return Some(mark);
        }
    }
    None
}

/// Evaluates a board: win if a line is complete, draw only on a full
/// board with no line, otherwise ongoing.
///
/// A completed line takes precedence over a full board, so the ninth
/// move winning is reported as a win, never a draw.
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        return Outcome::Win(winner);
    }
    if board.is_full() {
        return Outcome::Draw;
    }
    Outcome::Ongoing
}
