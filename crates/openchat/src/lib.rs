//! openchat: encrypted long-poll room chat.
//!
//! `core` holds the runtime-free pieces (cipher, wire envelope, usernames);
//! `client` holds the async transport, long poll and room API.
//! Most callers only need [`prelude`].

pub mod core {
    pub use openchat_core::*;
}

pub mod client {
    pub use openchat_client::*;
}

pub mod prelude {
    pub use openchat_client::api::ChatApi;
    pub use openchat_client::app_state::AppState;
    pub use openchat_client::config::{load_from_file, load_from_str, ClientConfig};
    pub use openchat_client::models::{ChatMessage, OutgoingMessage, PollCursor, PollResult};
    pub use openchat_client::{ClientError, TransportError};
    pub use openchat_core::{username_for, CipherCodec, Identity, OpenChatError};
}
