//! openchat client binary
//!
//! `openchat-client [config.yaml] [room-id]`
//! - Creates a room when no id is given, then joins it
//! - Long-polls messages and online users until Ctrl-C
//! - Sends each stdin line as a message
//! - Leaves the room on shutdown

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use openchat_client::api::ChatApi;
use openchat_client::app_state::AppState;
use openchat_client::config::{self, ClientConfig};
use openchat_client::models::{OutgoingMessage, PollCursor};
use openchat_client::ClientError;
use openchat_core::OpenChatError;

const DEFAULT_CONFIG_PATH: &str = "openchat.yaml";

/// Pause after a failed poll before the next attempt.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "openchat-client failed");
            1
        }
    };
    // a pending stdin read would otherwise hold the runtime open
    std::process::exit(code);
}

async fn run() -> Result<(), ClientError> {
    let mut args = std::env::args().skip(1);
    let cfg_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let room_arg = args.next();

    let cfg = if Path::new(&cfg_path).exists() {
        config::load_from_file(&cfg_path)?
    } else {
        tracing::warn!(path = %cfg_path, "config not found, using defaults");
        ClientConfig::default()
    };

    let state = AppState::new(cfg)?;
    let username = state.identity().generate_username().await?.to_string();
    let api = state.api().clone();

    let room_id = match room_arg {
        Some(id) => id,
        None => api.create_room().await?.room_id,
    };
    let joined = api.join_room(&room_id, &username).await?;
    tracing::info!(room = %room_id, me = %username, online = ?joined.online_users, "in room");

    let shutdown = CancellationToken::new();
    let messages = tokio::spawn(message_loop(api.clone(), room_id.clone(), shutdown.clone()));
    let users = tokio::spawn(user_loop(api.clone(), room_id.clone(), shutdown.clone()));
    let input = tokio::spawn(input_loop(
        api.clone(),
        room_id.clone(),
        username.clone(),
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| OpenChatError::Internal(format!("signal handler: {e}")))?;
    tracing::info!("shutting down");
    shutdown.cancel();

    let (messages, users, input) = tokio::join!(messages, users, input);
    report_task_failures([("messages", messages), ("users", users), ("input", input)]);
    api.leave_room(&room_id, &username).await
}

async fn message_loop(api: ChatApi, room_id: String, shutdown: CancellationToken) {
    let mut cursor = PollCursor::new(room_id);
    loop {
        match api.long_poll().poll(&cursor, Some(&shutdown)).await {
            Ok(batch) => {
                for m in &batch.messages {
                    tracing::info!(id = m.id, from = %m.username, "{}", m.content);
                }
                cursor.advance(&batch);
            }
            Err(e) if e.is_cancelled() || shutdown.is_cancelled() => break,
            Err(e) => {
                tracing::warn!(error = %e, room = %cursor.room_id, "message poll failed");
                if pause(&shutdown).await {
                    break;
                }
            }
        }
    }
}

async fn user_loop(api: ChatApi, room_id: String, shutdown: CancellationToken) {
    let mut last: Vec<String> = Vec::new();
    loop {
        match api.get_online_users(&room_id, None, Some(&shutdown)).await {
            Ok(r) => {
                if r.online_users != last {
                    tracing::info!(room = %room_id, online = ?r.online_users, "online users");
                    last = r.online_users;
                }
            }
            Err(e) if e.is_cancelled() || shutdown.is_cancelled() => break,
            Err(e) => {
                tracing::warn!(error = %e, room = %room_id, "user poll failed");
                if pause(&shutdown).await {
                    break;
                }
            }
        }
    }
}

async fn input_loop(api: ChatApi, room_id: String, username: String, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };
        let text = match line {
            Ok(Some(text)) => text,
            // stdin closed
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if let Err(e) = api
            .send_message(&room_id, &OutgoingMessage::new(text, username.as_str()))
            .await
        {
            tracing::warn!(error = %e, "send failed");
        }
    }
}

/// Log every task that panicked or was aborted; returns their names.
fn report_task_failures<const N: usize>(
    outcomes: [(&'static str, Result<(), JoinError>); N],
) -> Vec<&'static str> {
    let mut failed = Vec::new();
    for (task, outcome) in outcomes {
        if let Err(e) = outcome {
            tracing::error!(task, error = %e, "session task failed");
            failed.push(task);
        }
    }
    failed
}

/// Sleep for [`RETRY_PAUSE`]; true if shutdown fired meanwhile.
async fn pause(shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => true,
        _ = tokio::time::sleep(RETRY_PAUSE) => false,
    }
}
