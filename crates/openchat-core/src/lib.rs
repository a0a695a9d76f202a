//! openchat core: runtime-free primitives shared by the client and its tooling.
//!
//! This crate defines the wire contracts (request/response envelopes, query
//! flattening), the envelope cipher, and the deterministic username scheme.
//! It carries no async runtime or HTTP dependency so the same rules can be
//! reused by any transport.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `OpenChatError`/`Result`; the one deliberate
//! exception is the cipher's fail-open boundary (see [`cipher::CipherCodec`]).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cipher;
pub mod error;
pub mod identity;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, OpenChatError, Result};

pub use cipher::CipherCodec;
pub use identity::{username_for, Identity};
