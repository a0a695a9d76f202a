//! Room payloads as the server sends them (camelCase JSON).

use serde::{Deserialize, Serialize};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Result of a long poll (messages and/or online users).
///
/// Every field is optional on the wire: a poll that timed out may come back
/// as `{}` or with no data at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub online_users: Vec<String>,
    #[serde(default)]
    pub last_message_id: Option<u64>,
}

impl PollResult {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.online_users.is_empty()
    }

    /// Highest message id in this batch.
    pub fn max_message_id(&self) -> Option<u64> {
        self.messages.iter().map(|m| m.id).max()
    }
}

/// Room metadata from `/room/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub online_users: Vec<String>,
    #[serde(default)]
    pub online_count: Option<u32>,
}

/// `/room/create` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: String,
}

/// What a caller sends with `/room/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    pub username: String,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
        }
    }
}

/// Caller-held message watermark.
///
/// The long-poll client never touches this; the polling loop owns it and calls
/// [`PollCursor::advance`] after each successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCursor {
    pub room_id: String,
    pub last_message_id: u64,
}

impl PollCursor {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            last_message_id: 0,
        }
    }

    pub fn starting_at(room_id: impl Into<String>, last_message_id: u64) -> Self {
        Self {
            room_id: room_id.into(),
            last_message_id,
        }
    }

    /// Move to the max id seen in `batch`. Never moves backwards.
    pub fn advance(&mut self, batch: &PollResult) -> bool {
        match batch.max_message_id() {
            Some(max) if max > self.last_message_id => {
                self.last_message_id = max;
                true
            }
            _ => false,
        }
    }
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
