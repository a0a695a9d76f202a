//! In-process fake room server shared by the integration tests.
//!
//! Speaks the real wire format: every request must be a single-field
//! encrypted envelope; every payload goes back encrypted. Message and user
//! polls are held open on a per-room `Notify` until data arrives or the
//! declared timeout passes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use openchat_client::app_state::AppState;
use openchat_client::config::{ApiSection, ClientConfig};
use openchat_client::identity::StaticFingerprintEngine;
use openchat_client::transport::ReqwestHttpClient;
use openchat_core::protocol::ResponseEnvelope;
use openchat_core::CipherCodec;

pub const FINGERPRINT: &str = "8f14e45fceea167a5a36dedd4bea2543";

type Reply = Json<ResponseEnvelope>;

#[derive(Default)]
pub struct Room {
    pub messages: Vec<Value>,
    pub users: BTreeSet<String>,
    pub new_message: Arc<Notify>,
    pub users_changed: Arc<Notify>,
}

#[derive(Default)]
pub struct ServerState {
    pub codec: CipherCodec,
    pub rooms: DashMap<String, Room>,
    next_room: AtomicU64,
    next_message: AtomicU64,
    /// Count of requests that arrived at the message poll endpoint.
    pub message_polls: AtomicU64,
}

impl ServerState {
    fn open(&self, body: &Value) -> Result<Value, Reply> {
        let obj = body
            .as_object()
            .ok_or_else(|| reject(400, "body must be an envelope"))?;
        if obj.len() != 1 {
            return Err(reject(400, "envelope must have exactly one field"));
        }
        let ct = obj
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| reject(400, "envelope data must be a string"))?;
        let plain = self
            .codec
            .try_decrypt(ct)
            .map_err(|_| reject(400, "bad ciphertext"))?;
        serde_json::from_str(&plain).map_err(|_| reject(400, "payload is not json"))
    }

    fn ok(&self, data: Value) -> Reply {
        let ct = self.codec.encrypt_text(&data.to_string());
        Json(ResponseEnvelope::success(Some(Value::String(ct))))
    }

    fn messages_after(&self, room_id: &str, last: u64) -> Vec<Value> {
        self.rooms
            .get(room_id)
            .map(|r| {
                r.messages
                    .iter()
                    .filter(|m| m["id"].as_u64().unwrap_or(0) > last)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn users_of(&self, room_id: &str) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(|r| r.users.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert a message directly (bypassing HTTP); returns its id.
    pub fn push_message(&self, room_id: &str, username: &str, content: &str) -> u64 {
        let id = self.next_message.fetch_add(1, Ordering::SeqCst) + 1;
        let notify = {
            let mut room = self.rooms.entry(room_id.to_string()).or_default();
            room.messages.push(json!({
                "id": id,
                "roomId": room_id,
                "userId": null,
                "username": username,
                "content": content,
                "createdAt": "2024-01-01T00:00:00"
            }));
            Arc::clone(&room.new_message)
        };
        notify.notify_waiters();
        id
    }
}

fn reject(code: i64, message: &str) -> Reply {
    Json(ResponseEnvelope::failure(code, message))
}

fn field<'a>(req: &'a Value, key: &str) -> &'a str {
    req.get(key).and_then(Value::as_str).unwrap_or_default()
}

async fn create(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    if let Err(r) = s.open(&body) {
        return r;
    }
    let n = s.next_room.fetch_add(1, Ordering::SeqCst) + 1;
    let room_id = format!("room{n}");
    s.rooms.insert(room_id.clone(), Room::default());
    s.ok(json!({ "roomId": room_id }))
}

async fn join(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId");
    let notify = {
        let Some(mut room) = s.rooms.get_mut(room_id) else {
            return reject(500, "room not found");
        };
        room.users.insert(field(&req, "username").to_string());
        Arc::clone(&room.users_changed)
    };
    notify.notify_waiters();
    s.ok(json!({ "messages": [], "onlineUsers": s.users_of(room_id), "lastMessageId": null }))
}

async fn leave(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId");
    let (notify, empty) = {
        let Some(mut room) = s.rooms.get_mut(room_id) else {
            return reject(500, "room not found");
        };
        room.users.remove(field(&req, "username"));
        (Arc::clone(&room.users_changed), room.users.is_empty())
    };
    if empty {
        s.rooms.remove(room_id);
    }
    notify.notify_waiters();
    Json(ResponseEnvelope::success(None))
}

async fn info(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId");
    if !s.rooms.contains_key(room_id) {
        return reject(500, "room not found");
    }
    let users = s.users_of(room_id);
    s.ok(json!({
        "id": room_id,
        "name": format!("Room {room_id}"),
        "onlineUsers": users,
        "onlineCount": users.len(),
    }))
}

async fn send(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId");
    if !s.rooms.contains_key(room_id) {
        return reject(500, "room not found");
    }
    s.push_message(room_id, field(&req, "username"), field(&req, "content"));
    Json(ResponseEnvelope::success(None))
}

async fn messages(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    s.message_polls.fetch_add(1, Ordering::SeqCst);
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId").to_string();
    let last = req["lastMessageId"].as_u64().unwrap_or(0);
    let timeout = req["timeout"].as_u64().unwrap_or(30);

    let Some(notify) = s.rooms.get(&room_id).map(|r| Arc::clone(&r.new_message)) else {
        return reject(500, "room not found");
    };
    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout);

    loop {
        let notified = notify.notified();
        let batch = s.messages_after(&room_id, last);
        if !batch.is_empty() {
            let max = batch.iter().filter_map(|m| m["id"].as_u64()).max();
            return s.ok(json!({ "messages": batch, "lastMessageId": max }));
        }
        if tokio::time::timeout_at(deadline, notified).await.is_err() {
            return s.ok(json!({ "messages": [] }));
        }
    }
}

async fn users(State(s): State<Arc<ServerState>>, Json(body): Json<Value>) -> Reply {
    let req = match s.open(&body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let room_id = field(&req, "roomId").to_string();
    let timeout = req["timeout"].as_u64().unwrap_or(30);

    let Some(notify) = s.rooms.get(&room_id).map(|r| Arc::clone(&r.users_changed)) else {
        return reject(500, "room not found");
    };
    let _ = tokio::time::timeout(Duration::from_secs(timeout), notify.notified()).await;
    s.ok(json!({ "messages": [], "onlineUsers": s.users_of(&room_id) }))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance")
}

async fn plaintext() -> Json<Value> {
    Json(json!({ "code": 200, "data": "not-ciphertext" }))
}

pub struct FakeServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl FakeServer {
    pub async fn start() -> Self {
        init_tracing();
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .route("/api/room/create", post(create))
            .route("/api/room/join", post(join))
            .route("/api/room/leave", post(leave))
            .route("/api/room/info", post(info))
            .route("/api/room/users", post(users))
            .route("/api/room/messages", post(messages))
            .route("/api/room/message", post(send))
            .route("/api/broken", post(broken))
            .route("/api/plaintext", post(plaintext))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api: ApiSection {
                base_url: self.base_url.clone(),
                ..ApiSection::default()
            },
            ..ClientConfig::default()
        }
    }

    pub fn client(&self) -> AppState {
        AppState::with_parts(
            self.config(),
            Arc::new(ReqwestHttpClient::new()),
            Arc::new(StaticFingerprintEngine::new(FINGERPRINT)),
        )
        .expect("client state")
    }
}

fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}
