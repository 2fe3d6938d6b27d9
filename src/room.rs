//! Room domain types: participants, status, and the per-game session state.

use crate::error::RoomError;
use crate::games::tictactoe::{Board, Difficulty, Mark, Outcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Opaque unique identifier for a room.
pub type RoomId = String;

/// Unique identifier for a participant.
pub type ParticipantId = String;

/// A human participant seated in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant's unique ID.
    pub id: ParticipantId,
    /// Which mark this participant plays.
    pub mark: Mark,
}

/// Lifecycle status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// One participant, waiting for an opponent.
    Waiting,
    /// Two participants (or one human plus the AI); moves accepted.
    InProgress,
    /// Game decided, forfeited, or abandoned. Terminal.
    Finished,
}

/// One game session between up to two participants.
///
/// Rooms are owned exclusively by the [`crate::RoomManager`];
/// collaborators only ever hold the room identifier.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// The board.
    pub board: Board,
    /// Participant playing X (the creator).
    pub player_x: Option<Participant>,
    /// Participant playing O.
    pub player_o: Option<Participant>,
    /// AI opponent playing O, if attached.
    pub ai: Option<Difficulty>,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Terminal classification; `Ongoing` until the room finishes.
    pub outcome: Outcome,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the second participant arrived and play began.
    pub started_at: Option<DateTime<Utc>>,
    /// Last successful mutation, for idle expiry.
    pub last_activity: DateTime<Utc>,
}

impl Room {
    /// Creates a waiting room with the creator seated as X.
    #[instrument(skip(creator_id))]
    pub fn new(id: RoomId, creator_id: ParticipantId) -> Self {
        info!(room_id = %id, creator_id = %creator_id, "creating room");
        let now = Utc::now();
        Self {
            id,
            board: Board::new(),
            player_x: Some(Participant {
                id: creator_id,
                mark: Mark::X,
            }),
            player_o: None,
            ai: None,
            status: RoomStatus::Waiting,
            outcome: Outcome::Ongoing,
            created_at: now,
            started_at: None,
            last_activity: now,
        }
    }

    /// Gets the seated participant with the given ID.
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        [&self.player_x, &self.player_o]
            .into_iter()
            .flatten()
            .find(|p| p.id == participant_id)
    }

    /// Seats a participant in the first free slot and returns their mark.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::AlreadyJoined`] if the ID is already seated,
    /// or [`RoomError::RoomFull`] if both slots (or the AI slot) are taken.
    pub fn seat(&mut self, participant_id: ParticipantId) -> Result<Mark, RoomError> {
        if self.participant(&participant_id).is_some() {
            return Err(RoomError::AlreadyJoined);
        }
        if self.player_x.is_none() {
            self.player_x = Some(Participant {
                id: participant_id,
                mark: Mark::X,
            });
            Ok(Mark::X)
        } else if self.player_o.is_none() && self.ai.is_none() {
            self.player_o = Some(Participant {
                id: participant_id,
                mark: Mark::O,
            });
            Ok(Mark::O)
        } else {
            Err(RoomError::RoomFull)
        }
    }

    /// IDs of the seated human participants.
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        [&self.player_x, &self.player_o]
            .into_iter()
            .flatten()
            .map(|p| p.id.clone())
            .collect()
    }

    /// Records a successful mutation for idle-expiry bookkeeping.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// Serializable summary of a room, returned to callers after a mutation
/// so they observe the settled state (including any AI reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    /// Room identifier.
    pub room_id: RoomId,
    /// Encoded board ('X', 'O', '.'), row-major.
    pub board: String,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Terminal classification.
    pub outcome: Outcome,
    /// Mark to move next, `None` once finished.
    pub turn: Option<Mark>,
}

impl RoomView {
    /// Builds a view from the room's current state.
    pub fn of(room: &Room) -> Self {
        let turn = match room.status {
            RoomStatus::Finished => None,
            _ => Some(room.board.to_move()),
        };
        Self {
            room_id: room.id.clone(),
            board: room.board.encode(),
            status: room.status,
            outcome: room.outcome,
            turn,
        }
    }
}

/// Finalized summary of a completed game, written once when a room
/// transitions to `Finished` and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Room identifier; unique per record.
    pub room_id: RoomId,
    /// Final board, encoded as 9 characters.
    pub board: String,
    /// Terminal outcome (never `Ongoing`).
    pub outcome: Outcome,
    /// The 1-2 human participant IDs.
    pub participants: Vec<ParticipantId>,
    /// When play began.
    pub started_at: DateTime<Utc>,
    /// When the room finished.
    pub ended_at: DateTime<Utc>,
}

impl GameRecord {
    /// Builds the record for a finished room.
    pub fn of(room: &Room) -> Self {
        Self {
            room_id: room.id.clone(),
            board: room.board.encode(),
            outcome: room.outcome,
            participants: room.participant_ids(),
            started_at: room.started_at.unwrap_or(room.created_at),
            ended_at: Utc::now(),
        }
    }
}
