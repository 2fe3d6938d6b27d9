//! Game implementations. Tic-tac-toe is the only game for now.

pub mod tictactoe;
