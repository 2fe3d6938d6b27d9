//! Database models for stored game records.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use std::str::FromStr;

use crate::db::{DbError, schema};
use crate::games::tictactoe::{Mark, Outcome};
use crate::room::GameRecord;

/// A completed-game record as stored in the database.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct StoredGameRecord {
    id: i32,
    room_id: String,
    board: String,
    winner: String,
    participants: String,
    started_at: NaiveDateTime,
    ended_at: NaiveDateTime,
}

impl StoredGameRecord {
    /// Splits the comma-separated participant column back into IDs.
    pub fn participant_ids(&self) -> Vec<String> {
        self.participants
            .split(',')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parses the stored winner column into an [`Outcome`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    pub fn parse_outcome(&self) -> Result<Outcome, DbError> {
        outcome_from_db(&self.winner)
    }
}

/// Insertable model for recording a finished game.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct NewGameRecord {
    room_id: String,
    board: String,
    winner: String,
    participants: String,
    started_at: NaiveDateTime,
    ended_at: NaiveDateTime,
}

impl From<&GameRecord> for NewGameRecord {
    fn from(record: &GameRecord) -> Self {
        Self::new(
            record.room_id.clone(),
            record.board.clone(),
            outcome_to_db(record.outcome),
            record.participants.join(","),
            record.started_at.naive_utc(),
            record.ended_at.naive_utc(),
        )
    }
}

/// Converts an outcome to the string stored in the winner column.
fn outcome_to_db(outcome: Outcome) -> String {
    match outcome {
        Outcome::Win(mark) => mark.to_string(),
        Outcome::Draw => "draw".to_string(),
        Outcome::Ongoing => "ongoing".to_string(),
    }
}

/// Parses the winner column back into an outcome.
fn outcome_from_db(s: &str) -> Result<Outcome, DbError> {
    match s {
        "draw" => Ok(Outcome::Draw),
        "ongoing" => Ok(Outcome::Ongoing),
        other => Mark::from_str(other)
            .map(Outcome::Win)
            .map_err(|_| DbError::new(format!("Invalid winner value: '{}'", other))),
    }
}
