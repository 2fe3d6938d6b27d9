//! Noughts - multiplayer tic-tac-toe game-room core.
//!
//! # Architecture
//!
//! - **Board engine**: pure move application and win/draw detection
//!   ([`games::tictactoe`])
//! - **AI selector**: random or minimax-optimal opponent moves
//!   ([`games::tictactoe::ai`])
//! - **Room manager**: room lifecycle with per-room serialization
//!   ([`RoomManager`])
//! - **Session broadcaster**: request validation and notification fan-out
//!   ([`SessionBroadcaster`])
//! - **History recorder**: write-once persistence of finished games
//!   ([`HistoryRecorder`])
//!
//! # Example
//!
//! ```no_run
//! use noughts::{RoomManager, games::tictactoe::Cell};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! # fn example() -> Result<(), noughts::RoomError> {
//! let (events_tx, _events_rx) = mpsc::unbounded_channel();
//! let (records_tx, _records_rx) = mpsc::unbounded_channel();
//! let manager = Arc::new(RoomManager::new(events_tx, records_tx));
//!
//! let room_id = manager.create_room("p1");
//! manager.join_room(&room_id, "p2")?;
//! manager.submit_move(&room_id, "p1", Cell::from_coords(0, 0)?)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod broadcast;
mod config;
mod db;
mod error;
mod events;
mod manager;
mod room;

// Public module declarations
pub mod games;

// Crate-level exports - Errors
pub use error::{ErrorKind, RoomError};

// Crate-level exports - Room domain
pub use room::{GameRecord, Participant, ParticipantId, Room, RoomId, RoomStatus, RoomView};

// Crate-level exports - Lifecycle and fan-out
pub use broadcast::SessionBroadcaster;
pub use events::{Notification, Request, RoomEvent};
pub use manager::RoomManager;

// Crate-level exports - Persistence
pub use db::{DbError, HistoryRecorder, MIGRATIONS, NewGameRecord, StoredGameRecord};

// Crate-level exports - Configuration
pub use config::{Config, ConfigError};
