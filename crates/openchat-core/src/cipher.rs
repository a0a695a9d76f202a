//! Envelope cipher: SM4 block cipher, ECB mode, PKCS#7 padding, hex text.
//!
//! ECB takes no IV, so encryption is deterministic: the same plaintext under
//! the same key always yields the same ciphertext. The server decodes with the
//! same parameters, so this must not change unilaterally.
//!
//! # Fail-open boundary
//! [`CipherCodec::try_encrypt`] and [`CipherCodec::try_decrypt`] are strict and
//! return [`Result`]. The public [`CipherCodec::encrypt`] / [`CipherCodec::decrypt`]
//! never fail: on a cipher error they log and hand back the original input.
//! Callers rely on never seeing a hard failure here, so both routes go through
//! the single [`fail_open`] branch.

use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use serde_json::Value;

use crate::error::{OpenChatError, Result};

type Sm4EcbEnc = ecb::Encryptor<sm4::Sm4>;
type Sm4EcbDec = ecb::Decryptor<sm4::Sm4>;

/// Pre-shared key, hex encoded (ASCII "1234567890ABCDEF").
pub const DEFAULT_KEY_HEX: &str = "31323334353637383930414243444546";

/// A 128-bit key is exactly 32 hex characters.
pub const KEY_HEX_LEN: usize = 32;

const KEY_LEN: usize = 16;

/// Symmetric codec for request and response payloads.
#[derive(Clone)]
pub struct CipherCodec {
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for CipherCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherCodec").finish_non_exhaustive()
    }
}

impl Default for CipherCodec {
    fn default() -> Self {
        Self {
            key: *b"1234567890ABCDEF",
        }
    }
}

impl CipherCodec {
    /// Build a codec from a 32-character hex key.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        if key_hex.len() != KEY_HEX_LEN {
            return Err(OpenChatError::InvalidConfig(format!(
                "cipher key must be {KEY_HEX_LEN} hex characters, got {}",
                key_hex.len()
            )));
        }
        let bytes = hex::decode(key_hex)
            .map_err(|e| OpenChatError::InvalidConfig(format!("cipher key is not hex: {e}")))?;
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| OpenChatError::InvalidConfig("cipher key must be 16 bytes".into()))?;
        Ok(Self { key })
    }

    /// Strict encryption of UTF-8 text to lowercase hex ciphertext.
    pub fn try_encrypt(&self, plaintext: &str) -> Result<String> {
        let enc = Sm4EcbEnc::new_from_slice(&self.key)
            .map_err(|e| OpenChatError::Cipher(format!("key init: {e}")))?;
        let ct = enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(hex::encode(ct))
    }

    /// Strict decryption of hex ciphertext back to UTF-8 text.
    pub fn try_decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = hex::decode(ciphertext.trim())
            .map_err(|e| OpenChatError::Cipher(format!("ciphertext is not hex: {e}")))?;
        let dec = Sm4EcbDec::new_from_slice(&self.key)
            .map_err(|e| OpenChatError::Cipher(format!("key init: {e}")))?;
        let plain = dec
            .decrypt_padded_vec_mut::<Pkcs7>(&raw)
            .map_err(|e| OpenChatError::Cipher(format!("unpad: {e}")))?;
        String::from_utf8(plain)
            .map_err(|e| OpenChatError::Cipher(format!("plaintext is not utf-8: {e}")))
    }

    /// Encrypt text, falling back to the text itself on failure.
    pub fn encrypt_text(&self, plaintext: &str) -> String {
        fail_open("encrypt", self.try_encrypt(plaintext), || plaintext.to_string())
    }

    /// Encrypt any JSON value.
    ///
    /// Strings are encrypted as-is; records, arrays, numbers and booleans are
    /// first serialized to one JSON string. Empty values (`null`, `""`, `0`,
    /// `false`) pass through unencrypted.
    pub fn encrypt(&self, input: &Value) -> Value {
        if is_empty_value(input) {
            return input.clone();
        }
        let text = match input {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        fail_open(
            "encrypt",
            self.try_encrypt(&text).map(Value::String),
            || input.clone(),
        )
    }

    /// Decrypt a ciphertext value.
    ///
    /// If the plaintext is JSON it is returned structured, otherwise as a
    /// string. Empty values pass through as in [`CipherCodec::encrypt`];
    /// anything else that fails to decrypt (including non-string input) is
    /// returned unchanged.
    pub fn decrypt(&self, input: &Value) -> Value {
        if is_empty_value(input) {
            return input.clone();
        }
        let outcome = match input {
            Value::String(s) => self.try_decrypt(s).map(parse_plaintext),
            other => Err(OpenChatError::Cipher(format!(
                "ciphertext must be a string, got {}",
                kind(other)
            ))),
        };
        fail_open("decrypt", outcome, || input.clone())
    }

    /// Decrypt a ciphertext string; see [`CipherCodec::decrypt`].
    pub fn decrypt_text(&self, ciphertext: &str) -> Value {
        self.decrypt(&Value::String(ciphertext.to_string()))
    }
}

/// `null`, `""`, `false` and numeric zero are never run through the cipher.
fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn parse_plaintext(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn fail_open<T>(op: &'static str, outcome: Result<T>, original: impl FnOnce() -> T) -> T {
    match outcome {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(op, error = %e, code = e.code().as_str(), "cipher failed, passing input through");
            original()
        }
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn default_key_matches_hex_constant() {
        let a = CipherCodec::default();
        let b = CipherCodec::from_hex(DEFAULT_KEY_HEX).unwrap();
        assert_eq!(a.try_encrypt("hello").unwrap(), b.try_encrypt("hello").unwrap());
    }

    #[test]
    fn rejects_bad_keys() {
        let short = CipherCodec::from_hex("3132").unwrap_err();
        assert_eq!(short.code().as_str(), "INVALID_CONFIG");
        let not_hex = CipherCodec::from_hex("zz323334353637383930414243444546").unwrap_err();
        assert_eq!(not_hex.code().as_str(), "INVALID_CONFIG");
    }

    #[test]
    fn hello_round_trip() {
        let codec = CipherCodec::default();
        let ct = codec.encrypt(&json!("hello"));
        assert_ne!(ct, json!("hello"));
        assert_eq!(codec.decrypt(&ct), json!("hello"));
    }

    #[test]
    fn encryption_is_deterministic() {
        let codec = CipherCodec::default();
        let x = json!({"roomId": "r1", "content": "hi"});
        assert_eq!(codec.encrypt(&x), codec.encrypt(&x));
    }

    #[test]
    fn structured_input_comes_back_structured() {
        let codec = CipherCodec::default();
        let x = json!({"roomId": "r1", "lastMessageId": 5, "tags": ["a", "b"]});
        assert_eq!(codec.decrypt(&codec.encrypt(&x)), x);

        let n = json!(42);
        assert_eq!(codec.decrypt(&codec.encrypt(&n)), n);
    }

    #[test]
    fn empty_input_passes_through() {
        let codec = CipherCodec::default();
        assert_eq!(codec.encrypt(&Value::Null), Value::Null);
        assert_eq!(codec.encrypt(&json!("")), json!(""));
        assert_eq!(codec.decrypt(&json!("")), json!(""));
    }

    #[test]
    fn zero_and_false_pass_through() {
        let codec = CipherCodec::default();
        for v in [json!(0), json!(0.0), json!(false)] {
            assert_eq!(codec.encrypt(&v), v);
            assert_eq!(codec.decrypt(&v), v);
        }
        // non-empty scalars are still encrypted
        assert!(codec.encrypt(&json!(true)).is_string());
        assert!(codec.encrypt(&json!(1)).is_string());
        // empty containers are truthy
        assert!(codec.encrypt(&json!([])).is_string());
        assert!(codec.encrypt(&json!({})).is_string());
    }

    #[test]
    fn corrupted_ciphertext_fails_open() {
        let codec = CipherCodec::default();
        // not hex
        assert_eq!(codec.decrypt(&json!("not-cipher")), json!("not-cipher"));
        // hex, but not a whole number of blocks
        assert_eq!(codec.decrypt(&json!("abcdef")), json!("abcdef"));
        // non-string payload
        let obj = json!({"plain": true});
        assert_eq!(codec.decrypt(&obj), obj);
    }

    #[test]
    fn strict_path_reports_errors() {
        let codec = CipherCodec::default();
        let err = codec.try_decrypt("abcdef").unwrap_err();
        assert_eq!(err.code().as_str(), "CIPHER");
    }

    #[test]
    fn wrong_key_fails_open() {
        let ours = CipherCodec::default();
        let theirs = CipherCodec::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let ct = ours.encrypt_text("{\"roomId\":\"r1\"}");
        // wrong key almost always breaks the padding; either way no panic
        let out = theirs.decrypt_text(&ct);
        assert_ne!(out, json!({"roomId": "r1"}));
    }
}
