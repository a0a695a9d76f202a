//! Room API: one typed method per endpoint.

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::longpoll::LongPollClient;
use crate::models::{CreatedRoom, OutgoingMessage, PollResult, RoomInfo};
use crate::transport::{RequestConfig, TransportPipeline};

/// Endpoint paths, relative to the API prefix.
pub mod endpoints {
    pub const CREATE_ROOM: &str = "/room/create";
    pub const JOIN_ROOM: &str = "/room/join";
    pub const LEAVE_ROOM: &str = "/room/leave";
    pub const ROOM_INFO: &str = "/room/info";
    pub const ONLINE_USERS: &str = "/room/users";
    pub const MESSAGES: &str = "/room/messages";
    pub const SEND_MESSAGE: &str = "/room/message";
}

#[derive(Clone)]
pub struct ChatApi {
    pipeline: Arc<TransportPipeline>,
    poll: LongPollClient,
}

impl ChatApi {
    pub fn new(pipeline: Arc<TransportPipeline>) -> Self {
        let poll = LongPollClient::new(Arc::clone(&pipeline));
        Self { pipeline, poll }
    }

    pub fn with_poll_client(pipeline: Arc<TransportPipeline>, poll: LongPollClient) -> Self {
        Self { pipeline, poll }
    }

    pub fn pipeline(&self) -> &TransportPipeline {
        &self.pipeline
    }

    pub fn long_poll(&self) -> &LongPollClient {
        &self.poll
    }

    pub async fn create_room(&self) -> Result<CreatedRoom, ClientError> {
        let cfg = RequestConfig::post(endpoints::CREATE_ROOM).data(json!({}));
        let room: CreatedRoom = self.pipeline.call(cfg).await?.ok_or_else(|| {
            ClientError::MalformedResponse("create room returned no room id".into())
        })?;
        tracing::info!(room = %room.room_id, "room created");
        Ok(room)
    }

    /// Join and get the room's current online users back.
    pub async fn join_room(&self, room_id: &str, username: &str) -> Result<PollResult, ClientError> {
        let cfg = RequestConfig::post(endpoints::JOIN_ROOM)
            .data(json!({ "roomId": room_id, "username": username }));
        let joined = self.pipeline.call::<PollResult>(cfg).await?.unwrap_or_default();
        tracing::info!(room = %room_id, username, online = joined.online_users.len(), "joined room");
        Ok(joined)
    }

    pub async fn leave_room(&self, room_id: &str, username: &str) -> Result<(), ClientError> {
        let cfg = RequestConfig::post(endpoints::LEAVE_ROOM)
            .data(json!({ "roomId": room_id, "username": username }));
        self.pipeline.request(cfg).await?;
        tracing::info!(room = %room_id, username, "left room");
        Ok(())
    }

    /// `None` when the server knows the id but has no data (room dissolved).
    pub async fn get_room_info(&self, room_id: &str) -> Result<Option<RoomInfo>, ClientError> {
        let cfg = RequestConfig::post(endpoints::ROOM_INFO).data(json!({ "roomId": room_id }));
        self.pipeline.call(cfg).await
    }

    pub async fn get_online_users(
        &self,
        room_id: &str,
        timeout_secs: Option<u64>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult, ClientError> {
        self.poll.get_online_users(room_id, timeout_secs, cancel).await
    }

    pub async fn get_messages(
        &self,
        room_id: &str,
        last_message_id: u64,
        timeout_secs: Option<u64>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult, ClientError> {
        self.poll
            .get_messages(room_id, last_message_id, timeout_secs, cancel)
            .await
    }

    pub async fn send_message(
        &self,
        room_id: &str,
        message: &OutgoingMessage,
    ) -> Result<(), ClientError> {
        let cfg = RequestConfig::post(endpoints::SEND_MESSAGE).data(json!({
            "roomId": room_id,
            "content": message.content,
            "username": message.username,
        }));
        self.pipeline.request(cfg).await?;
        tracing::debug!(room = %room_id, username = %message.username, "message sent");
        Ok(())
    }
}
