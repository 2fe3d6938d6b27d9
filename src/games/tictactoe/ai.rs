//! AI move selection for single-player rooms.

use super::cell::Cell;
use super::rules::{self, Outcome};
use super::types::{Board, Mark, Square};
use crate::error::RoomError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// AI strategy level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Uniform random choice among empty cells.
    Easy,
    /// Exhaustive minimax, game-theoretically optimal.
    #[default]
    Hard,
}

/// Selects a move for `mark` on the given board.
///
/// Easy picks uniformly at random among empty cells; hard runs a full
/// minimax search and is deterministic for a fixed board.
///
/// # Errors
///
/// Returns [`RoomError::NoLegalMove`] if the board is full or the game
/// is already decided.
#[instrument(skip(board), fields(board = %board.encode()))]
pub fn select_move(board: &Board, mark: Mark, difficulty: Difficulty) -> Result<Cell, RoomError> {
    select_move_with_rng(board, mark, difficulty, &mut rand::thread_rng())
}

/// [`select_move`] with a caller-supplied RNG, so easy-difficulty
/// selection can be seeded in tests.
pub fn select_move_with_rng<R: Rng>(
    board: &Board,
    mark: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Cell, RoomError> {
    if rules::evaluate(board).is_decided() {
        return Err(RoomError::NoLegalMove);
    }
    match difficulty {
        Difficulty::Easy => {
            let empty = board.empty_cells();
            // evaluate() already rejected full boards
            let cell = empty[rng.gen_range(0..empty.len())];
            debug!(cell = %cell, "easy AI picked random cell");
            Ok(cell)
        }
        Difficulty::Hard => {
            let cell = best_move(board, mark).ok_or(RoomError::NoLegalMove)?;
            debug!(cell = %cell, "hard AI picked minimax cell");
            Ok(cell)
        }
    }
}

/// Finds the minimax-optimal cell for `mark`.
///
/// Candidates are scanned in center > corners > edges order and only a
/// strictly better score replaces the incumbent, so the result is
/// deterministic for a fixed board.
fn best_move(board: &Board, mark: Mark) -> Option<Cell> {
    let mut best: Option<(Cell, i32)> = None;
    for cell in Cell::PREFERENCE {
        if !board.is_empty(cell) {
            continue;
        }
        let mut next = *board;
        next.set(cell, Square::Occupied(mark));
        let score = minimax(&next, mark, 1);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((cell, score));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Scores a position from the AI's perspective.
///
/// Wins score `10 - depth` and losses `depth - 10`, so faster wins and
/// slower losses are preferred. Draws score 0.
fn minimax(board: &Board, ai: Mark, depth: i32) -> i32 {
    match rules::evaluate(board) {
        Outcome::Win(mark) if mark == ai => return 10 - depth,
        Outcome::Win(_) => return depth - 10,
        Outcome::Draw => return 0,
        Outcome::Ongoing => {}
    }

    let to_move = board.to_move();
    let maximizing = to_move == ai;
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for cell in Cell::PREFERENCE {
        if !board.is_empty(cell) {
            continue;
        }
        let mut next = *board;
        next.set(cell, Square::Occupied(to_move));
        let score = minimax(&next, ai, depth + 1);
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }
    best
}
