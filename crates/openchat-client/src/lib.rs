//! openchat client library entry.
//!
//! This crate wires the envelope cipher, the HTTP transport pipeline, the
//! long-poll client, the room API, and device identity into one client stack.
//! It is consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod identity;
pub mod longpoll;
pub mod models;
pub mod transport;

pub use error::{ClientError, TransportError};
