//! Validated cell addressing for the 3x3 board.

use crate::error::RoomError;
use serde::{Deserialize, Serialize};

/// A cell on the board, identified by a row-major index in 0..9.
///
/// A `Cell` can only be constructed through [`Cell::from_coords`] or
/// [`Cell::from_index`], so a held value is always in bounds and board
/// access through it never needs a range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Cell(usize);

impl Cell {
    /// Creates a cell from `(row, col)` coordinates, both in 0..3.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidCell`] if either coordinate is out of range.
    pub fn from_coords(row: u8, col: u8) -> Result<Self, RoomError> {
        if row >= 3 || col >= 3 {
            return Err(RoomError::InvalidCell { row, col });
        }
        Ok(Self(row as usize * 3 + col as usize))
    }

    /// Creates a cell from a row-major index in 0..9.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::InvalidCell`] if the index is out of range.
    pub fn from_index(index: usize) -> Result<Self, RoomError> {
        if index >= 9 {
            return Err(RoomError::InvalidCell {
                row: (index / 3) as u8,
                col: (index % 3) as u8,
            });
        }
        Ok(Self(index))
    }

    /// Returns the row-major index (0-8).
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns the row (0-2).
    pub fn row(self) -> u8 {
        (self.0 / 3) as u8
    }

    /// Returns the column (0-2).
    pub fn col(self) -> u8 {
        (self.0 % 3) as u8
    }

    /// All 9 cells in index order.
    pub const ALL: [Cell; 9] = [
        Cell(0),
        Cell(1),
        Cell(2),
        Cell(3),
        Cell(4),
        Cell(5),
        Cell(6),
        Cell(7),
        Cell(8),
    ];

    /// Cells in AI preference order: center, then corners, then edges.
    ///
    /// Scanning candidates in this order makes equal-score tie-breaks
    /// deterministic for the hard difficulty.
    pub const PREFERENCE: [Cell; 9] = [
        Cell(4),
        Cell(0),
        Cell(2),
        Cell(6),
        Cell(8),
        Cell(1),
        Cell(3),
        Cell(5),
        Cell(7),
    ];
}

impl TryFrom<usize> for Cell {
    type Error = RoomError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

impl From<Cell> for usize {
    fn from(cell: Cell) -> Self {
        cell.index()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}
