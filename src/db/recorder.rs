//! Write-once recorder for finished games.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, instrument, warn};

use crate::db::{DbError, NewGameRecord, StoredGameRecord, schema};
use crate::room::GameRecord;

/// Embedded schema migrations, applied at startup and in test setup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const MAX_WRITE_ATTEMPTS: u32 = 5;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Persists finalized game summaries to SQLite.
///
/// Writes are idempotent per room identifier: recording a room that is
/// already stored is a no-op, not an error. Persistence failures are
/// retried here and never surface to the game action that finished the
/// room.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    db_path: String,
}

impl HistoryRecorder {
    /// Creates a recorder for the database at the given path, applying
    /// pending migrations.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests,
    /// though each call to an operation opens a fresh connection, so
    /// file-backed databases are needed for state to persist).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "creating history recorder");
        let mut conn = SqliteConnection::establish(&db_path)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Stores a finished game. Returns `true` if a row was written,
    /// `false` if the room was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, record), fields(room_id = %record.room_id, outcome = %record.outcome))]
    pub fn record(&self, record: &GameRecord) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let new_record = NewGameRecord::from(record);

        let inserted = diesel::insert_into(schema::game_records::table)
            .values(&new_record)
            .on_conflict(schema::game_records::room_id)
            .do_nothing()
            .execute(&mut conn)?;

        if inserted > 0 {
            info!(room_id = %record.room_id, "game record stored");
        } else {
            debug!(room_id = %record.room_id, "room already recorded, no-op");
        }
        Ok(inserted > 0)
    }

    /// Lists stored records, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_recent(&self, limit: i64) -> Result<Vec<StoredGameRecord>, DbError> {
        let mut conn = self.connection()?;

        let records = schema::game_records::table
            .order((
                schema::game_records::ended_at.desc(),
                schema::game_records::id.desc(),
            ))
            .limit(limit)
            .load::<StoredGameRecord>(&mut conn)?;

        info!(count = records.len(), "game records loaded");
        Ok(records)
    }

    /// Consumes finished-game records from the manager's channel until
    /// it closes, writing each with bounded retry and backoff.
    pub async fn run(self, mut records: UnboundedReceiver<GameRecord>) {
        info!("history recorder loop started");
        while let Some(record) = records.recv().await {
            self.record_with_retry(&record).await;
        }
        info!("history recorder loop stopped");
    }

    async fn record_with_retry(&self, record: &GameRecord) {
        let mut delay = RETRY_BASE_DELAY;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            match self.record(record) {
                Ok(_) => return,
                Err(err) => {
                    warn!(
                        room_id = %record.room_id,
                        attempt,
                        %err,
                        "game record write failed"
                    );
                    if attempt < MAX_WRITE_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }
        error!(room_id = %record.room_id, "giving up on game record after retries");
    }
}
