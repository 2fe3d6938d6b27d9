//! Tests for the AI move selector.

use noughts::RoomError;
use noughts::games::tictactoe::{Board, Cell, Difficulty, Mark, Outcome, ai, evaluate};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn cell(row: u8, col: u8) -> Cell {
    Cell::from_coords(row, col).expect("valid coords")
}

fn play(moves: &[(u8, u8)]) -> Board {
    let mut board = Board::new();
    for (i, (row, col)) in moves.iter().enumerate() {
        let mark = if i % 2 == 0 { Mark::X } else { Mark::O };
        board
            .apply_move(cell(*row, *col), mark)
            .expect("legal move");
    }
    board
}

#[test]
fn test_no_legal_move_on_decided_board() {
    // X wins row 0; no further AI move exists even with cells free.
    let board = play(&[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
    let result = ai::select_move(&board, Mark::O, Difficulty::Hard);
    assert_eq!(result, Err(RoomError::NoLegalMove));
}

#[test]
fn test_easy_returns_legal_move() {
    let board = play(&[(0, 0), (1, 1), (2, 2)]);
    let mut rng = StdRng::seed_from_u64(42);
    let cell = ai::select_move_with_rng(&board, Mark::O, Difficulty::Easy, &mut rng)
        .expect("board has empty cells");
    assert!(board.is_empty(cell));
}

#[test]
fn test_easy_is_reproducible_with_seeded_rng() {
    let board = play(&[(0, 0)]);
    let pick = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        ai::select_move_with_rng(&board, Mark::O, Difficulty::Easy, &mut rng).unwrap()
    };
    assert_eq!(pick(7), pick(7));
}

#[test]
fn test_hard_is_deterministic() {
    let board = play(&[(0, 0), (1, 1), (2, 0)]);
    let first = ai::select_move(&board, Mark::O, Difficulty::Hard).unwrap();
    for _ in 0..5 {
        assert_eq!(
            ai::select_move(&board, Mark::O, Difficulty::Hard).unwrap(),
            first
        );
    }
}

#[test]
fn test_hard_takes_immediate_win() {
    // O holds (1,0) and (1,1); completing row 1 wins.
    let board = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2)]);
    let reply = ai::select_move(&board, Mark::O, Difficulty::Hard).unwrap();
    assert_eq!(reply, cell(1, 2));
}

#[test]
fn test_hard_blocks_immediate_threat() {
    // X threatens row 0 at (0,2); O must block.
    let board = play(&[(0, 0), (1, 1), (0, 1), (2, 2)]);
    let reply = ai::select_move(&board, Mark::O, Difficulty::Hard).unwrap();
    assert_eq!(reply, cell(0, 2));
}

#[test]
fn test_hard_prefers_winning_over_blocking() {
    // Both sides have an open line; taking the win beats blocking.
    let board = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (2, 0)]);
    // X to move: (0,2) wins row 0 immediately.
    let reply = ai::select_move(&board, Mark::X, Difficulty::Hard).unwrap();
    assert_eq!(reply, cell(0, 2));
}

#[test]
fn test_hard_opens_with_preferred_cell() {
    // All opening moves score equal; the tie-break picks the center.
    let reply = ai::select_move(&Board::new(), Mark::X, Difficulty::Hard).unwrap();
    assert_eq!(reply, cell(1, 1));
}

/// Exhaustively plays every X strategy against the hard AI as O and
/// asserts X never wins: the standard optimal-play guarantee.
#[test]
fn test_hard_moving_second_never_loses() {
    fn explore(board: Board) {
        for x_cell in board.empty_cells() {
            let mut next = board;
            next.apply_move(x_cell, Mark::X).unwrap();
            match evaluate(&next) {
                Outcome::Win(Mark::X) => {
                    panic!("X forced a win against hard AI: {}", next.encode())
                }
                Outcome::Win(Mark::O) | Outcome::Draw => continue,
                Outcome::Ongoing => {
                    let reply = ai::select_move(&next, Mark::O, Difficulty::Hard).unwrap();
                    next.apply_move(reply, Mark::O).unwrap();
                    match evaluate(&next) {
                        Outcome::Win(Mark::X) => unreachable!("O's move cannot win for X"),
                        Outcome::Win(Mark::O) | Outcome::Draw => continue,
                        Outcome::Ongoing => explore(next),
                    }
                }
            }
        }
    }
    explore(Board::new());
}
