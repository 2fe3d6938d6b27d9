//! Room lifecycle management.
//!
//! One `RoomManager` instance owns every active room. Each room sits
//! behind its own lock, so mutations against one room serialize while
//! unrelated rooms proceed in parallel; the outer map lock is held only
//! for lookup, insert, and removal, never across a room mutation.

use crate::error::RoomError;
use crate::events::RoomEvent;
use crate::games::tictactoe::{Cell, Difficulty, Mark, Outcome, ai, evaluate};
use crate::room::{GameRecord, Room, RoomId, RoomStatus, RoomView};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Owns the set of active rooms and applies all mutations to them.
///
/// State changes are pushed as [`RoomEvent`]s to the event channel;
/// finished rooms additionally produce one [`GameRecord`] on the record
/// channel, fire-and-forget relative to the room's transition.
#[derive(Debug)]
pub struct RoomManager {
    rooms: Mutex<HashMap<RoomId, Arc<Mutex<Room>>>>,
    events: UnboundedSender<RoomEvent>,
    records: UnboundedSender<GameRecord>,
}

impl RoomManager {
    /// Creates a manager publishing events and finished-game records to
    /// the given channels.
    #[instrument(skip(events, records))]
    pub fn new(events: UnboundedSender<RoomEvent>, records: UnboundedSender<GameRecord>) -> Self {
        info!("creating room manager");
        Self {
            rooms: Mutex::new(HashMap::new()),
            events,
            records,
        }
    }

    /// Creates a fresh room with the creator seated as X. Always succeeds.
    #[instrument(skip(self))]
    pub fn create_room(&self, creator_id: &str) -> RoomId {
        let room_id = uuid::Uuid::new_v4().simple().to_string();
        let room = Room::new(room_id.clone(), creator_id.to_string());
        self.rooms
            .lock()
            .unwrap()
            .insert(room_id.clone(), Arc::new(Mutex::new(room)));
        info!(room_id = %room_id, creator_id, "room created");
        self.emit(RoomEvent::RoomCreated {
            room_id: room_id.clone(),
            creator_id: creator_id.to_string(),
        });
        room_id
    }

    /// Seats a second participant as O and starts the game.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::RoomNotFound`], [`RoomError::RoomAlreadyFinished`],
    /// [`RoomError::AlreadyJoined`], or [`RoomError::RoomFull`].
    #[instrument(skip(self))]
    pub fn join_room(&self, room_id: &str, participant_id: &str) -> Result<Mark, RoomError> {
        let handle = self.room_handle(room_id)?;
        let mut room = handle.lock().unwrap();

        if room.status == RoomStatus::Finished {
            return Err(RoomError::RoomAlreadyFinished);
        }
        let mark = room.seat(participant_id.to_string())?;
        if room.status == RoomStatus::Waiting && (room.player_o.is_some() || room.ai.is_some()) {
            room.status = RoomStatus::InProgress;
            room.started_at = Some(Utc::now());
        }
        room.touch();
        info!(room_id, participant_id, mark = %mark, "participant joined");
        self.emit(RoomEvent::ParticipantJoined {
            room_id: room_id.to_string(),
            participant_id: participant_id.to_string(),
        });
        Ok(mark)
    }

    /// Attaches an AI opponent as O; if it is already the AI's turn, the
    /// AI moves immediately inside the same serialized section.
    ///
    /// On a room that already has its AI attached this is the
    /// "request AI move" convenience: the difficulty is updated and the
    /// AI plays if due.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::RoomNotFound`], [`RoomError::RoomAlreadyFinished`],
    /// or [`RoomError::RoomFull`] if a human already holds the O seat.
    #[instrument(skip(self))]
    pub fn attach_ai(&self, room_id: &str, difficulty: Difficulty) -> Result<RoomView, RoomError> {
        let handle = self.room_handle(room_id)?;
        let mut room = handle.lock().unwrap();

        if room.status == RoomStatus::Finished {
            return Err(RoomError::RoomAlreadyFinished);
        }
        if room.ai.is_none() && room.player_o.is_some() {
            return Err(RoomError::RoomFull);
        }
        room.ai = Some(difficulty);
        if room.status == RoomStatus::Waiting {
            room.status = RoomStatus::InProgress;
            room.started_at = Some(Utc::now());
            info!(room_id, ?difficulty, "AI opponent attached");
        }
        room.touch();
        self.play_ai_if_due(&mut room);
        Ok(RoomView::of(&room))
    }

    /// Applies a participant's move, then any due AI reply, inside one
    /// serialized section, so the caller observes a settled state.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::RoomNotFound`], [`RoomError::GameNotInProgress`],
    /// [`RoomError::UnknownParticipant`], [`RoomError::NotYourTurn`], or
    /// [`RoomError::CellOccupied`].
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        room_id: &str,
        participant_id: &str,
        cell: Cell,
    ) -> Result<RoomView, RoomError> {
        let handle = self.room_handle(room_id)?;
        let mut room = handle.lock().unwrap();

        if room.status != RoomStatus::InProgress {
            warn!(room_id, participant_id, status = ?room.status, "move on room not in progress");
            return Err(RoomError::GameNotInProgress);
        }
        let mark = room
            .participant(participant_id)
            .ok_or(RoomError::UnknownParticipant)?
            .mark;
        room.board.apply_move(cell, mark)?;
        room.touch();

        let outcome = evaluate(&room.board);
        debug!(room_id, participant_id, cell = %cell, %outcome, "move applied");
        self.emit(RoomEvent::MoveApplied {
            room_id: room.id.clone(),
            board: room.board,
            turn: (!outcome.is_decided()).then(|| room.board.to_move()),
            by: Some(participant_id.to_string()),
        });

        if outcome.is_decided() {
            self.finish(&mut room, outcome);
        } else {
            self.play_ai_if_due(&mut room);
        }
        Ok(RoomView::of(&room))
    }

    /// Removes a participant from a room.
    ///
    /// A waiting room is deleted; an in-progress game is forfeited to the
    /// remaining side; leaving a finished room only announces the departure.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::RoomNotFound`] or [`RoomError::UnknownParticipant`].
    #[instrument(skip(self))]
    pub fn leave_room(&self, room_id: &str, participant_id: &str) -> Result<(), RoomError> {
        let handle = self.room_handle(room_id)?;
        let mut delete = false;
        {
            let mut room = handle.lock().unwrap();
            let mark = room
                .participant(participant_id)
                .ok_or(RoomError::UnknownParticipant)?
                .mark;

            self.emit(RoomEvent::ParticipantLeft {
                room_id: room.id.clone(),
                participant_id: participant_id.to_string(),
            });

            match room.status {
                RoomStatus::Waiting => {
                    info!(room_id, participant_id, "creator left waiting room, deleting");
                    delete = true;
                }
                RoomStatus::InProgress => {
                    let winner = mark.opponent();
                    info!(room_id, participant_id, winner = %winner, "forfeit, awarding win");
                    self.finish(&mut room, Outcome::Win(winner));
                }
                RoomStatus::Finished => {
                    debug!(room_id, participant_id, "left finished room");
                }
            }
        }
        // Room lock must be released before touching the map again.
        if delete {
            self.rooms.lock().unwrap().remove(room_id);
        }
        Ok(())
    }

    /// Removes rooms with no activity for longer than `max_idle`.
    ///
    /// Documented extension to the core lifecycle: expired in-progress
    /// rooms are treated as abandoned, with no forfeit win and no
    /// [`GameRecord`]. Returns the number of rooms removed.
    #[instrument(skip(self))]
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut rooms = self.rooms.lock().unwrap();
        let before = rooms.len();
        let now = Utc::now();
        rooms.retain(|room_id, handle| {
            let mut room = handle.lock().unwrap();
            let idle = (now - room.last_activity).to_std().unwrap_or_default();
            let keep = idle <= max_idle;
            if !keep {
                info!(room_id = %room_id, status = ?room.status, "expiring idle room");
                // A mutation may already hold a clone of this handle from
                // a lookup that raced the sweep. Finishing the room here,
                // under its lock, makes the status checks in every
                // mutation path reject it once they get the lock.
                room.status = RoomStatus::Finished;
            }
            keep
        });
        before - rooms.len()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }

    /// Looks up the handle for a room; fails fast when it is unknown.
    fn room_handle(&self, room_id: &str) -> Result<Arc<Mutex<Room>>, RoomError> {
        self.rooms
            .lock()
            .unwrap()
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    /// Plays the AI reply if an AI is attached and it is O's turn.
    ///
    /// Runs under the caller's room lock, so the reply can never
    /// interleave with a concurrent mutation on the same room.
    fn play_ai_if_due(&self, room: &mut Room) {
        let Some(difficulty) = room.ai else { return };
        if room.status != RoomStatus::InProgress || room.board.to_move() != Mark::O {
            return;
        }
        let cell = match ai::select_move(&room.board, Mark::O, difficulty) {
            Ok(cell) => cell,
            Err(err) => {
                // Unreachable after a legal human move on an undecided board.
                warn!(room_id = %room.id, %err, "AI found no move");
                return;
            }
        };
        if let Err(err) = room.board.apply_move(cell, Mark::O) {
            warn!(room_id = %room.id, %err, "AI move rejected");
            return;
        }
        let outcome = evaluate(&room.board);
        debug!(room_id = %room.id, cell = %cell, %outcome, "AI move applied");
        self.emit(RoomEvent::MoveApplied {
            room_id: room.id.clone(),
            board: room.board,
            turn: (!outcome.is_decided()).then(|| room.board.to_move()),
            by: None,
        });
        if outcome.is_decided() {
            self.finish(room, outcome);
        }
    }

    /// Marks a room finished and hands the record off to the recorder.
    ///
    /// The hand-off is fire-and-forget: the room is finished whether or
    /// not the record write has completed.
    fn finish(&self, room: &mut Room, outcome: Outcome) {
        room.status = RoomStatus::Finished;
        room.outcome = outcome;
        room.touch();
        info!(room_id = %room.id, %outcome, "game finished");
        self.emit(RoomEvent::GameFinished {
            room_id: room.id.clone(),
            outcome,
        });
        if self.records.send(GameRecord::of(room)).is_err() {
            warn!(room_id = %room.id, "record channel closed, game record dropped");
        }
    }

    /// Publishes a state-change event; a missing consumer is not an error.
    fn emit(&self, event: RoomEvent) {
        if self.events.send(event).is_err() {
            debug!("event channel closed, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    /// A lookup can clone a room handle just before the expiry sweep
    /// removes the room from the map. The sweep finishes the room under
    /// its own lock, so the late mutation through the stale handle is
    /// rejected instead of reviving a room no one can address.
    #[test]
    fn test_stale_handle_after_expiry_cannot_mutate_room() {
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (records_tx, mut records_rx) = mpsc::unbounded_channel();
        let manager = RoomManager::new(events_tx, records_tx);
        let room_id = manager.create_room("p1");
        manager.join_room(&room_id, "p2").unwrap();

        let handle = manager.room_handle(&room_id).unwrap();
        assert_eq!(manager.expire_idle(Duration::ZERO), 1);

        // The orphaned room carries the terminal status, so the status
        // checks at the top of join/submit/attach all reject it once
        // they acquire this lock.
        let room = handle.lock().unwrap();
        assert_eq!(room.status, RoomStatus::Finished);
        drop(room);

        assert_eq!(
            manager.join_room(&room_id, "p3"),
            Err(RoomError::RoomNotFound(room_id))
        );
        // Abandonment, not a forfeit: nothing was recorded.
        assert!(records_rx.try_recv().is_err());
    }
}
