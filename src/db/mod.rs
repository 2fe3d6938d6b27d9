//! Persistence layer for completed-game records.

mod error;
mod models;
mod recorder;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{NewGameRecord, StoredGameRecord};
pub use recorder::{HistoryRecorder, MIGRATIONS};
