//! Error taxonomy for room operations.
//!
//! Every error is reported synchronously to the requesting caller and is
//! never retried by the core. Persistence failures are handled inside the
//! recorder ([`crate::db`]) and do not appear here.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Broad classification of a [`RoomError`], mirrored to callers so a
/// transport can map kinds to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed identifier or coordinate; rejected before any state change.
    Validation,
    /// Request conflicts with current room state; no state change.
    Conflict,
    /// The addressed room does not exist.
    NotFound,
}

/// Errors produced by room operations.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RoomError {
    /// Coordinate outside the 3x3 grid.
    #[display("cell ({row}, {col}) is out of bounds")]
    InvalidCell {
        /// Requested row.
        row: u8,
        /// Requested column.
        col: u8,
    },
    /// Identifier is empty, too long, or contains invalid characters.
    #[display("malformed identifier: {_0:?}")]
    InvalidIdentifier(String),
    /// No room exists with the given identifier.
    #[display("room {_0} not found")]
    RoomNotFound(String),
    /// Room already has two participants.
    #[display("room already has two participants")]
    RoomFull,
    /// Participant is already seated in this room.
    #[display("participant is already in this room")]
    AlreadyJoined,
    /// Room has already finished.
    #[display("room is already finished")]
    RoomAlreadyFinished,
    /// Room is not in progress (still waiting, or finished).
    #[display("game is not in progress")]
    GameNotInProgress,
    /// It is the other participant's turn.
    #[display("not your turn")]
    NotYourTurn,
    /// Target cell already holds a mark.
    #[display("cell is already occupied")]
    CellOccupied,
    /// Participant is not seated in the addressed room.
    #[display("participant is not in this room")]
    UnknownParticipant,
    /// The board is full or the game is decided; the AI has no move.
    #[display("no legal move available")]
    NoLegalMove,
}

impl RoomError {
    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::InvalidCell { .. } | RoomError::InvalidIdentifier(_) => {
                ErrorKind::Validation
            }
            RoomError::RoomNotFound(_) => ErrorKind::NotFound,
            RoomError::RoomFull
            | RoomError::AlreadyJoined
            | RoomError::RoomAlreadyFinished
            | RoomError::GameNotInProgress
            | RoomError::NotYourTurn
            | RoomError::CellOccupied
            | RoomError::UnknownParticipant
            | RoomError::NoLegalMove => ErrorKind::Conflict,
        }
    }
}

impl std::error::Error for RoomError {}
