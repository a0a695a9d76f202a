//! Long-poll client: server-held requests for messages and online users.
//!
//! Each call is a single bounded attempt. There is no loop, backoff or
//! coalescing here; the caller owns the cadence and the cursor.

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::api::endpoints;
use crate::error::ClientError;
use crate::models::{PollCursor, PollResult};
use crate::transport::{RequestConfig, TransportPipeline};

/// Server hold time used when the caller does not pick one.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct LongPollClient {
    pipeline: Arc<TransportPipeline>,
    default_timeout_secs: u64,
}

impl LongPollClient {
    pub fn new(pipeline: Arc<TransportPipeline>) -> Self {
        Self {
            pipeline,
            default_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        }
    }

    pub fn with_default_timeout(mut self, secs: u64) -> Self {
        self.default_timeout_secs = secs;
        self
    }

    pub fn default_timeout_secs(&self) -> u64 {
        self.default_timeout_secs
    }

    /// Messages in `room_id` with id strictly greater than `last_message_id`.
    ///
    /// The server may hold the call for up to `timeout_secs`; an empty batch
    /// on timeout is a normal success. `cancel` aborts the call promptly.
    pub async fn get_messages(
        &self,
        room_id: &str,
        last_message_id: u64,
        timeout_secs: Option<u64>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult, ClientError> {
        let timeout = timeout_secs.unwrap_or(self.default_timeout_secs);
        tracing::debug!(room = %room_id, last_message_id, timeout, "poll messages");

        let cfg = RequestConfig::post(endpoints::MESSAGES)
            .data(json!({
                "roomId": room_id,
                "lastMessageId": last_message_id,
                "timeout": timeout,
            }))
            .timeout_secs(timeout)
            .signal(cancel.cloned());

        let batch = self.pipeline.call::<PollResult>(cfg).await?.unwrap_or_default();
        tracing::debug!(room = %room_id, count = batch.messages.len(), "poll messages done");
        Ok(batch)
    }

    /// [`get_messages`](Self::get_messages) driven by a caller-held cursor.
    /// The cursor is read, not advanced.
    pub async fn poll(
        &self,
        cursor: &PollCursor,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult, ClientError> {
        self.get_messages(&cursor.room_id, cursor.last_message_id, None, cancel)
            .await
    }

    /// Current online users of `room_id`, held like a message poll.
    pub async fn get_online_users(
        &self,
        room_id: &str,
        timeout_secs: Option<u64>,
        cancel: Option<&CancellationToken>,
    ) -> Result<PollResult, ClientError> {
        let timeout = timeout_secs.unwrap_or(self.default_timeout_secs);
        tracing::debug!(room = %room_id, timeout, "poll online users");

        let cfg = RequestConfig::post(endpoints::ONLINE_USERS)
            .data(json!({
                "roomId": room_id,
                "timeout": timeout,
            }))
            .timeout_secs(timeout)
            .signal(cancel.cloned());

        Ok(self.pipeline.call::<PollResult>(cfg).await?.unwrap_or_default())
    }
}
