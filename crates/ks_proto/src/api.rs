//! API request/response types shared between the relay and its clients.
//! These map directly to JSON bodies on the wire.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::message::Message;

// ── Keys ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadKeyRequest {
    /// PEM public key (SPKI or PKCS#1).
    #[serde(default)]
    pub public_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadKeyResponse {
    pub status: String,
    pub user_id: UserId,
    /// Fingerprint of the key now on file, for out-of-band comparison.
    pub fingerprint: String,
}

// ── Messages ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Nil when absent; rejected by the relay.
    #[serde(default, alias = "receiverId")]
    pub recipient_id: UserId,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub status: String,
    pub message: Message,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMessageResponse {
    pub status: String,
    pub message: Message,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub status: String,
}

// ── Common ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
