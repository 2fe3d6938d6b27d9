//! Noughts - tic-tac-toe room server over a JSON-lines stdio channel.
//!
//! Each stdin line is an [`Envelope`] naming the connected participant
//! and their request; responses and relayed notifications go to stdout
//! as one JSON object per line, tagged with the addressee. Logs go to
//! stderr so they never interleave with the wire format.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use noughts::{
    Config, ErrorKind, HistoryRecorder, Notification, Request, RoomManager, SessionBroadcaster,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// One inbound stdin line: who is asking, and what for.
#[derive(Debug, Deserialize)]
struct Envelope {
    participant_id: String,
    request: Request,
}

/// One outbound stdout line: the addressee and their notification.
#[derive(Debug, Serialize)]
struct Outbound<'a> {
    to: &'a str,
    notification: &'a Notification,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { config } => serve(config).await,
        Command::History { config, limit } => history(config, limit),
    }
}

/// Runs the room server until stdin closes.
async fn serve(config_path: PathBuf) -> Result<()> {
    let config = Config::load(config_path)?;
    let recorder = HistoryRecorder::new(config.db_path.clone())?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (records_tx, records_rx) = mpsc::unbounded_channel();
    let manager = Arc::new(RoomManager::new(events_tx, records_tx));
    let broadcaster = Arc::new(SessionBroadcaster::new(manager.clone()));

    tokio::spawn(Arc::clone(&broadcaster).run(events_rx));
    tokio::spawn(recorder.clone().run(records_rx));
    spawn_expiry_sweeper(Arc::clone(&manager), config.idle_expiry_secs);

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
            {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    info!("serving rooms over stdio");
    let mut connected = HashSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%err, "malformed request line");
                let rejection = Notification::Error {
                    kind: ErrorKind::Validation,
                    message: format!("malformed request: {err}"),
                };
                send_line(&out_tx, "", &rejection);
                continue;
            }
        };
        if let Request::RequestAiMove { difficulty, .. } = &mut envelope.request
            && difficulty.is_none()
        {
            *difficulty = Some(config.default_difficulty);
        }
        ensure_connection(
            &broadcaster,
            &mut connected,
            &envelope.participant_id,
            &out_tx,
        );
        let response = broadcaster.handle(envelope.request);
        send_line(&out_tx, &envelope.participant_id, &response);
    }

    drop(out_tx);
    let _ = writer.await;
    info!("stdin closed, shutting down");
    Ok(())
}

/// Prints recently completed games.
fn history(config_path: PathBuf, limit: i64) -> Result<()> {
    let config = Config::load(config_path)?;
    let recorder = HistoryRecorder::new(config.db_path.clone())?;

    let records = recorder.list_recent(limit)?;
    if records.is_empty() {
        println!("No completed games recorded.");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  winner={}  participants=[{}]  board={}  ended={}",
            record.room_id(),
            record.winner(),
            record.participant_ids().join(", "),
            record.board(),
            record.ended_at(),
        );
    }
    Ok(())
}

/// Periodically reclaims rooms that have gone idle.
fn spawn_expiry_sweeper(manager: Arc<RoomManager>, idle_expiry_secs: u64) {
    let max_idle = Duration::from_secs(idle_expiry_secs);
    let sweep_every = max_idle.min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            let expired = manager.expire_idle(max_idle);
            if expired > 0 {
                info!(expired, "expired idle rooms");
            }
        }
    });
}

/// Registers the participant's notification channel on first sight and
/// spawns a forwarder from it to the shared stdout writer.
fn ensure_connection(
    broadcaster: &Arc<SessionBroadcaster>,
    connected: &mut HashSet<String>,
    participant_id: &str,
    out_tx: &UnboundedSender<String>,
) {
    if !connected.insert(participant_id.to_string()) {
        return;
    }
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Notification>();
    broadcaster.register(participant_id, notify_tx);

    let out_tx = out_tx.clone();
    let participant_id = participant_id.to_string();
    tokio::spawn(async move {
        while let Some(notification) = notify_rx.recv().await {
            match serde_json::to_string(&Outbound {
                to: &participant_id,
                notification: &notification,
            }) {
                Ok(line) => {
                    if out_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "failed to serialize notification"),
            }
        }
    });
}

/// Serializes and queues one outbound line.
fn send_line(out_tx: &UnboundedSender<String>, to: &str, notification: &Notification) {
    match serde_json::to_string(&Outbound { to, notification }) {
        Ok(line) => {
            let _ = out_tx.send(line);
        }
        Err(err) => warn!(%err, "failed to serialize response"),
    }
}
