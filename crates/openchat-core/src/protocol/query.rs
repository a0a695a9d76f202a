//! Explicit query-string construction for read calls.
//!
//! Keys are emitted in the order given. `null` values are skipped. Values are
//! percent-encoded with the same reserved set as `encodeURIComponent`, so the
//! server sees exactly what a browser client would send.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Flatten ordered pairs into `k1=v1&k2=v2` (no leading `?`).
pub fn flatten_query<K, I>(params: I) -> String
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Value)>,
{
    let mut out = String::new();
    for (key, value) in params {
        let Some(text) = scalar_text(&value) else { continue };
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(key.as_ref());
        out.push('=');
        out.extend(utf8_percent_encode(&text, COMPONENT));
    }
    out
}

/// Append flattened params to `path`; returns `path` untouched when nothing survives.
pub fn append_query<K, I>(path: &str, params: I) -> String
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Value)>,
{
    let query = flatten_query(params);
    if query.is_empty() {
        return path.to_string();
    }
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{query}")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // compound values travel as their JSON text
        other => Some(other.to_string()),
    }
}
