//! Session id generation
//!
//! A session id is the first 128 bits of SHA-256(timestamp_ms || hex(salt)),
//! rendered in the familiar 8-4-4-4-12 hyphenated form. The 16-byte salt
//! comes from the thread-local CSPRNG.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A freshly issued intake session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub name: String,
}

/// Issue a new session for a candidate. Nothing is persisted.
pub fn start_session(name: impl Into<String>) -> Session {
    Session {
        session_id: generate_session_id(),
        name: name.into(),
    }
}

/// Generate a new opaque session id
pub fn generate_session_id() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    session_id_from(chrono::Utc::now().timestamp_millis(), &salt)
}

fn session_id_from(timestamp_ms: i64, salt: &[u8; 16]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp_ms.to_string().as_bytes());
    hasher.update(hex(salt).as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(head).hyphenated().to_string()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
