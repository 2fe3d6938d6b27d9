//! Core domain types for tic-tac-toe.

use super::cell::Cell;
use crate::error::RoomError;
use serde::{Deserialize, Serialize};

/// A player's mark. X always moves first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mark {
    /// The X mark (moves first).
    X,
    /// The O mark (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board, squares in row-major order.
///
/// The side to move is derived from the mark counts rather than stored,
/// so the turn-alternation invariant cannot drift from the board contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Gets the square at the given cell.
    pub fn get(&self, cell: Cell) -> Square {
        self.squares[cell.index()]
    }

    /// Sets the square at the given cell without validation.
    pub(crate) fn set(&mut self, cell: Cell, square: Square) {
        self.squares[cell.index()] = square;
    }

    /// Checks if the square at the given cell is empty.
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.get(cell) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Checks if every square is occupied.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Counts the squares occupied by the given mark.
    pub fn count(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(mark))
            .count()
    }

    /// Returns the mark whose turn it is, derived from the mark counts.
    ///
    /// Equal counts mean X to move; one extra X means O to move.
    pub fn to_move(&self) -> Mark {
        if self.count(Mark::X) == self.count(Mark::O) {
            Mark::X
        } else {
            Mark::O
        }
    }

    /// Lists the empty cells in index order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        Cell::ALL
            .iter()
            .copied()
            .filter(|cell| self.is_empty(*cell))
            .collect()
    }

    /// Places a mark at the given cell, validating legality.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NotYourTurn`] if the mark does not match the
    /// derived side to move, or [`RoomError::CellOccupied`] if the cell
    /// already holds a mark.
    pub fn apply_move(&mut self, cell: Cell, mark: Mark) -> Result<(), RoomError> {
        if mark != self.to_move() {
            return Err(RoomError::NotYourTurn);
        }
        if !self.is_empty(cell) {
            return Err(RoomError::CellOccupied);
        }
        self.set(cell, Square::Occupied(mark));
        Ok(())
    }

    /// Encodes the board as a 9-character string ('X', 'O', '.').
    pub fn encode(&self) -> String {
        self.squares
            .iter()
            .map(|s| match s {
                Square::Empty => '.',
                Square::Occupied(Mark::X) => 'X',
                Square::Occupied(Mark::O) => 'O',
            })
            .collect()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.squares[row * 3 + col] {
                    Square::Empty => '.',
                    Square::Occupied(Mark::X) => 'X',
                    Square::Occupied(Mark::O) => 'O',
                };
                result.push(symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
