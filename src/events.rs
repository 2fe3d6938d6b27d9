//! Typed state-change events and the wire request/notification contracts.
//!
//! The room manager produces [`RoomEvent`]s; the session broadcaster
//! consumes them and fans out [`Notification`]s. The split keeps game
//! rules decoupled from whatever transport carries the notifications.

use crate::error::ErrorKind;
use crate::games::tictactoe::{Board, Difficulty, Mark, Outcome};
use crate::room::{ParticipantId, RoomId};
use serde::{Deserialize, Serialize};

/// A state change produced by the room manager.
///
/// Events carry the acting participant where one exists so the
/// broadcaster can skip echoing a participant's own action back at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// A room was created.
    RoomCreated {
        /// The new room.
        room_id: RoomId,
        /// Creator, seated as X.
        creator_id: ParticipantId,
    },
    /// A participant joined a waiting room.
    ParticipantJoined {
        /// The room.
        room_id: RoomId,
        /// The joiner, seated as O.
        participant_id: ParticipantId,
    },
    /// A move was applied to the board.
    MoveApplied {
        /// The room.
        room_id: RoomId,
        /// Board after the move.
        board: Board,
        /// Mark to move next, `None` if the game just finished.
        turn: Option<Mark>,
        /// The mover; `None` for AI moves.
        by: Option<ParticipantId>,
    },
    /// The room reached a terminal outcome.
    GameFinished {
        /// The room.
        room_id: RoomId,
        /// Win, or draw. Never `Ongoing`.
        outcome: Outcome,
    },
    /// A participant left the room.
    ParticipantLeft {
        /// The room.
        room_id: RoomId,
        /// The leaver.
        participant_id: ParticipantId,
    },
}

impl RoomEvent {
    /// The room this event concerns.
    pub fn room_id(&self) -> &RoomId {
        match self {
            RoomEvent::RoomCreated { room_id, .. }
            | RoomEvent::ParticipantJoined { room_id, .. }
            | RoomEvent::MoveApplied { room_id, .. }
            | RoomEvent::GameFinished { room_id, .. }
            | RoomEvent::ParticipantLeft { room_id, .. } => room_id,
        }
    }
}

/// Inbound request from a connected participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Create a fresh room with the caller seated as X.
    CreateRoom {
        /// The creator.
        creator_id: ParticipantId,
    },
    /// Join an existing waiting room as O.
    JoinRoom {
        /// Target room.
        room_id: RoomId,
        /// The joiner.
        participant_id: ParticipantId,
    },
    /// Place a mark at the given coordinates.
    SubmitMove {
        /// Target room.
        room_id: RoomId,
        /// The mover.
        participant_id: ParticipantId,
        /// Row, 0-2.
        row: u8,
        /// Column, 0-2.
        col: u8,
    },
    /// Leave the room; forfeits an in-progress game.
    LeaveRoom {
        /// Target room.
        room_id: RoomId,
        /// The leaver.
        participant_id: ParticipantId,
    },
    /// Single-player convenience: attach an AI opponent, and have it
    /// move immediately if it is the AI's turn.
    RequestAiMove {
        /// Target room.
        room_id: RoomId,
        /// AI strategy level; the configured default when absent.
        #[serde(default)]
        difficulty: Option<Difficulty>,
    },
}

/// Outbound notification to a connected participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A room was created.
    RoomCreated {
        /// The new room.
        room_id: RoomId,
    },
    /// A participant joined the room.
    ParticipantJoined {
        /// The room.
        room_id: RoomId,
        /// The joiner.
        participant_id: ParticipantId,
    },
    /// A move was applied.
    MoveApplied {
        /// The room.
        room_id: RoomId,
        /// Board after the move, encoded as 9 characters.
        board: String,
        /// Mark to move next, absent if the game just finished.
        turn: Option<Mark>,
    },
    /// The game reached a terminal outcome.
    GameFinished {
        /// The room.
        room_id: RoomId,
        /// Win or draw.
        outcome: Outcome,
    },
    /// A participant left the room.
    ParticipantLeft {
        /// The room.
        room_id: RoomId,
        /// The leaver.
        participant_id: ParticipantId,
    },
    /// The request failed; returned only to the requesting caller.
    Error {
        /// Broad error classification.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}
