//! Fan-out of room state changes to connected participants.
//!
//! The broadcaster sits between a transport and the room manager: it
//! structurally validates inbound [`Request`]s, forwards them, returns
//! the manager's result verbatim to the caller, and relays the event
//! stream to the other participants of the affected room.

use crate::error::RoomError;
use crate::events::{Notification, Request, RoomEvent};
use crate::games::tictactoe::Cell;
use crate::manager::RoomManager;
use crate::room::{ParticipantId, RoomId, RoomStatus, RoomView};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument, warn};

/// Longest accepted participant or room identifier.
const MAX_ID_LEN: usize = 64;

/// Routes requests to the room manager and notifications back out to
/// connected participants.
#[derive(Debug)]
pub struct SessionBroadcaster {
    manager: Arc<RoomManager>,
    connections: Mutex<HashMap<ParticipantId, UnboundedSender<Notification>>>,
    members: Mutex<HashMap<RoomId, Vec<ParticipantId>>>,
}

impl SessionBroadcaster {
    /// Creates a broadcaster in front of the given manager.
    #[instrument(skip(manager))]
    pub fn new(manager: Arc<RoomManager>) -> Self {
        info!("creating session broadcaster");
        Self {
            manager,
            connections: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a participant's outbound notification channel.
    #[instrument(skip(self, sender))]
    pub fn register(&self, participant_id: &str, sender: UnboundedSender<Notification>) {
        debug!(participant_id, "registering connection");
        self.connections
            .lock()
            .unwrap()
            .insert(participant_id.to_string(), sender);
    }

    /// Drops a participant's outbound notification channel.
    #[instrument(skip(self))]
    pub fn unregister(&self, participant_id: &str) {
        debug!(participant_id, "unregistering connection");
        self.connections.lock().unwrap().remove(participant_id);
    }

    /// Handles one inbound request, returning the caller's response.
    ///
    /// Failures come back as [`Notification::Error`]; side effects on
    /// success reach the other room participants through the event loop.
    #[instrument(skip(self))]
    pub fn handle(&self, request: Request) -> Notification {
        match self.dispatch(request) {
            Ok(notification) => notification,
            Err(err) => {
                warn!(%err, kind = ?err.kind(), "request rejected");
                Notification::Error {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }

    /// Consumes manager events until the channel closes.
    pub async fn run(self: Arc<Self>, mut events: UnboundedReceiver<RoomEvent>) {
        info!("broadcaster event loop started");
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        info!("broadcaster event loop stopped");
    }

    fn dispatch(&self, request: Request) -> Result<Notification, RoomError> {
        match request {
            Request::CreateRoom { creator_id } => {
                validate_id(&creator_id)?;
                let room_id = self.manager.create_room(&creator_id);
                Ok(Notification::RoomCreated { room_id })
            }
            Request::JoinRoom {
                room_id,
                participant_id,
            } => {
                validate_id(&room_id)?;
                validate_id(&participant_id)?;
                self.manager.join_room(&room_id, &participant_id)?;
                Ok(Notification::ParticipantJoined {
                    room_id,
                    participant_id,
                })
            }
            Request::SubmitMove {
                room_id,
                participant_id,
                row,
                col,
            } => {
                validate_id(&room_id)?;
                validate_id(&participant_id)?;
                let cell = Cell::from_coords(row, col)?;
                let view = self.manager.submit_move(&room_id, &participant_id, cell)?;
                Ok(view_notification(view))
            }
            Request::LeaveRoom {
                room_id,
                participant_id,
            } => {
                validate_id(&room_id)?;
                validate_id(&participant_id)?;
                self.manager.leave_room(&room_id, &participant_id)?;
                Ok(Notification::ParticipantLeft {
                    room_id,
                    participant_id,
                })
            }
            Request::RequestAiMove {
                room_id,
                difficulty,
            } => {
                validate_id(&room_id)?;
                let view = self
                    .manager
                    .attach_ai(&room_id, difficulty.unwrap_or_default())?;
                Ok(view_notification(view))
            }
        }
    }

    /// Updates room membership and fans one event out.
    fn apply(&self, event: RoomEvent) {
        match &event {
            RoomEvent::RoomCreated {
                room_id,
                creator_id,
            } => {
                self.members
                    .lock()
                    .unwrap()
                    .insert(room_id.clone(), vec![creator_id.clone()]);
            }
            RoomEvent::ParticipantJoined {
                room_id,
                participant_id,
            } => {
                let mut members = self.members.lock().unwrap();
                let seats = members.entry(room_id.clone()).or_default();
                if !seats.contains(participant_id) {
                    seats.push(participant_id.clone());
                }
                drop(members);
                self.fan_out(
                    room_id,
                    Some(participant_id),
                    Notification::ParticipantJoined {
                        room_id: room_id.clone(),
                        participant_id: participant_id.clone(),
                    },
                );
            }
            RoomEvent::MoveApplied {
                room_id,
                board,
                turn,
                by,
            } => {
                self.fan_out(
                    room_id,
                    by.as_deref(),
                    Notification::MoveApplied {
                        room_id: room_id.clone(),
                        board: board.encode(),
                        turn: *turn,
                    },
                );
            }
            RoomEvent::GameFinished { room_id, outcome } => {
                self.fan_out(
                    room_id,
                    None,
                    Notification::GameFinished {
                        room_id: room_id.clone(),
                        outcome: *outcome,
                    },
                );
                // Terminal for the room's fan-out scope.
                self.members.lock().unwrap().remove(room_id);
            }
            RoomEvent::ParticipantLeft {
                room_id,
                participant_id,
            } => {
                let mut members = self.members.lock().unwrap();
                if let Some(seats) = members.get_mut(room_id) {
                    seats.retain(|id| id != participant_id);
                    if seats.is_empty() {
                        members.remove(room_id);
                    }
                }
                drop(members);
                self.fan_out(
                    room_id,
                    Some(participant_id),
                    Notification::ParticipantLeft {
                        room_id: room_id.clone(),
                        participant_id: participant_id.clone(),
                    },
                );
            }
        }
    }

    /// Sends a notification to every room member except `skip`.
    fn fan_out(&self, room_id: &str, skip: Option<&str>, notification: Notification) {
        let members = self.members.lock().unwrap();
        let Some(seats) = members.get(room_id) else {
            return;
        };
        let connections = self.connections.lock().unwrap();
        for participant_id in seats {
            if Some(participant_id.as_str()) == skip {
                continue;
            }
            if let Some(sender) = connections.get(participant_id)
                && sender.send(notification.clone()).is_err()
            {
                debug!(participant_id = %participant_id, "dropping stale connection");
            }
        }
    }
}

/// Maps a settled room view to the caller's notification.
fn view_notification(view: RoomView) -> Notification {
    if view.status == RoomStatus::Finished {
        Notification::GameFinished {
            room_id: view.room_id,
            outcome: view.outcome,
        }
    } else {
        Notification::MoveApplied {
            room_id: view.room_id,
            board: view.board,
            turn: view.turn,
        }
    }
}

/// Structural identifier check: non-empty, bounded, URL-safe characters.
fn validate_id(id: &str) -> Result<(), RoomError> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(RoomError::InvalidIdentifier(id.to_string()))
    }
}
