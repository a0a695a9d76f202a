//! Deterministic pseudonyms derived from a device fingerprint.
//!
//! The name lists and the index formula are a compatibility contract: changing
//! either changes the name a returning user sees.

use serde::{Deserialize, Serialize};

pub const FIRST_NAMES: [&str; 20] = [
    "Alex", "Blake", "Charlie", "Drew", "Eden", "Finn", "Gray", "Harper", "Ivy", "Jordan",
    "Kelly", "Logan", "Morgan", "Noah", "Parker", "Quinn", "Riley", "Sam", "Taylor", "Val",
];

pub const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Brown", "Davis", "Wilson", "Moore", "Taylor", "Anderson", "Thomas",
    "White", "Harris", "Martin", "Thompson", "Young", "King", "Wright", "Lee", "Walker", "Hall",
    "Allen",
];

/// Number of distinct usernames (`F * L`).
pub const IDENTITY_SPACE: usize = FIRST_NAMES.len() * LAST_NAMES.len();

/// Sum over code points of each one's leading UTF-16 unit.
///
/// Astral characters contribute only their high surrogate.
pub fn fingerprint_hash(fingerprint: &str) -> u64 {
    let mut buf = [0u16; 2];
    fingerprint.chars().fold(0u64, |acc, c| {
        let lead = c.encode_utf16(&mut buf)[0];
        acc.wrapping_add(u64::from(lead))
    })
}

/// Username for a fingerprint: `FIRST[h % F] + LAST[(h * 13) % L]`.
pub fn username_for(fingerprint: &str) -> String {
    let hash = fingerprint_hash(fingerprint);
    let first = FIRST_NAMES[index(hash, FIRST_NAMES.len())];
    let last = LAST_NAMES[index(hash.wrapping_mul(13), LAST_NAMES.len())];
    format!("{first}{last}")
}

fn index(hash: u64, len: usize) -> usize {
    // len is a small constant, so the remainder always fits
    (hash % len as u64) as usize
}

/// Resolved device identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub fingerprint: String,
    pub username: String,
}

impl Identity {
    pub fn from_fingerprint(fingerprint: impl Into<String>) -> Self {
        let fingerprint = fingerprint.into();
        let username = username_for(&fingerprint);
        Self {
            fingerprint,
            username,
        }
    }
}
