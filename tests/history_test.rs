//! Tests for the history recorder.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use noughts::games::tictactoe::{Mark, Outcome};
use noughts::{GameRecord, HistoryRecorder};
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

/// Creates a temporary database file and a recorder over it. The file
/// handle must stay in scope to keep the database alive.
fn setup_test_db() -> (NamedTempFile, HistoryRecorder) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let recorder = HistoryRecorder::new(db_path).expect("Failed to create recorder");
    (db_file, recorder)
}

fn sample_record(room_id: &str, minutes_ago: i64) -> GameRecord {
    let ended_at = Utc::now() - Duration::minutes(minutes_ago);
    GameRecord {
        room_id: room_id.to_string(),
        board: "XXX.O...O".to_string(),
        outcome: Outcome::Win(Mark::X),
        participants: vec!["p1".to_string(), "p2".to_string()],
        started_at: ended_at - Duration::minutes(5),
        ended_at,
    }
}

#[test]
fn test_record_stores_game() {
    let (_db, recorder) = setup_test_db();
    let inserted = recorder
        .record(&sample_record("room1", 0))
        .expect("Record failed");
    assert!(inserted);

    let records = recorder.list_recent(10).expect("List failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].room_id(), "room1");
    assert_eq!(records[0].board(), "XXX.O...O");
    assert_eq!(records[0].winner(), "x");
    assert_eq!(records[0].participant_ids(), vec!["p1", "p2"]);
    assert_eq!(records[0].parse_outcome().unwrap(), Outcome::Win(Mark::X));
}

#[test]
fn test_record_is_idempotent_per_room() {
    let (_db, recorder) = setup_test_db();
    let record = sample_record("room1", 0);

    assert!(recorder.record(&record).expect("First record failed"));
    // A retried record for the same room is a no-op, not an error.
    assert!(!recorder.record(&record).expect("Retry must not fail"));

    let records = recorder.list_recent(10).expect("List failed");
    assert_eq!(records.len(), 1);
}

#[test]
fn test_draw_round_trips() {
    let (_db, recorder) = setup_test_db();
    let mut record = sample_record("room1", 0);
    record.outcome = Outcome::Draw;
    recorder.record(&record).expect("Record failed");

    let records = recorder.list_recent(1).expect("List failed");
    assert_eq!(records[0].winner(), "draw");
    assert_eq!(records[0].parse_outcome().unwrap(), Outcome::Draw);
}

#[test]
fn test_list_recent_newest_first() {
    let (_db, recorder) = setup_test_db();
    recorder
        .record(&sample_record("oldest", 30))
        .expect("Record failed");
    recorder
        .record(&sample_record("newest", 0))
        .expect("Record failed");
    recorder
        .record(&sample_record("middle", 10))
        .expect("Record failed");

    let records = recorder.list_recent(10).expect("List failed");
    let room_ids: Vec<_> = records.iter().map(|r| r.room_id().as_str()).collect();
    assert_eq!(room_ids, vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_list_recent_respects_limit() {
    let (_db, recorder) = setup_test_db();
    for i in 0..5 {
        recorder
            .record(&sample_record(&format!("room{i}"), i))
            .expect("Record failed");
    }
    let records = recorder.list_recent(2).expect("List failed");
    assert_eq!(records.len(), 2);
}

#[test]
fn test_list_recent_empty_database() {
    let (_db, recorder) = setup_test_db();
    let records = recorder.list_recent(10).expect("List failed");
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_run_loop_survives_persistent_write_failure() {
    let (db_file, recorder) = setup_test_db();
    // Drop the table out from under the recorder so every write fails.
    let mut conn =
        SqliteConnection::establish(db_file.path().to_str().expect("Invalid path"))
            .expect("Failed to open connection");
    diesel::sql_query("DROP TABLE game_records")
        .execute(&mut conn)
        .expect("Drop failed");

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(recorder.clone().run(rx));
    tx.send(sample_record("room1", 0)).expect("send record");
    drop(tx);

    // The loop retries with backoff, gives up, and completes without
    // panicking or surfacing the failure.
    handle.await.expect("recorder loop completes");
    assert!(recorder.list_recent(10).is_err());
}

#[tokio::test]
async fn test_run_loop_drains_record_channel() {
    let (_db, recorder) = setup_test_db();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(recorder.clone().run(rx));

    tx.send(sample_record("room1", 0)).expect("send record");
    drop(tx);
    handle.await.expect("recorder loop completes");

    let records = recorder.list_recent(10).expect("List failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].room_id(), "room1");
}
