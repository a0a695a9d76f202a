//! Wire protocol (HTTP + JSON envelopes).
//!
//! Every request body is a single-field [`Envelope`] carrying ciphertext;
//! every response body is a [`ResponseEnvelope`] whose `code` decides success.
//! Read calls are the one exception: their parameters travel as an explicit
//! query string built by [`query::flatten_query`].

pub mod envelope;
pub mod query;

pub use envelope::{Envelope, Method, ResponseEnvelope, DEFAULT_ERROR_MESSAGE, SUCCESS_CODE};
pub use query::{append_query, flatten_query};
