//! The persisted message record.

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, UserId};

/// Placeholder returned in place of every body on listing.
pub const REDACTED_BODY: &str = "[Encrypted]";

/// A stored message.  Once persisted, `body` only ever holds sealed
/// (base64) ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(alias = "receiverId")]
    pub recipient_id: UserId,
    pub body: String,
    /// RFC 3339, UTC, microsecond precision; sorts lexicographically.
    pub timestamp: String,
}

impl Message {
    /// Replace the body with the fixed placeholder.
    pub fn redacted(mut self) -> Self {
        self.body = REDACTED_BODY.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Message {
        Message {
            id: MessageId::new(),
            sender_id: UserId::new_random(),
            recipient_id: UserId::new_random(),
            body: "c2VhbGVk".into(),
            timestamp: "2024-05-01T10:00:00.000000Z".into(),
        }
    }

    #[test]
    fn redaction_keeps_metadata() {
        let msg = sample();
        let redacted = msg.clone().redacted();
        assert_eq!(redacted.body, REDACTED_BODY);
        assert_eq!(redacted.id, msg.id);
        assert_eq!(redacted.sender_id, msg.sender_id);
        assert_eq!(redacted.recipient_id, msg.recipient_id);
        assert_eq!(redacted.timestamp, msg.timestamp);
    }

    #[test]
    fn json_uses_camel_case_and_accepts_receiver_alias() {
        let msg = sample();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["senderId"], msg.sender_id.to_string());
        assert_eq!(json["recipientId"], msg.recipient_id.to_string());

        let legacy = serde_json::json!({
            "id": msg.id,
            "senderId": msg.sender_id,
            "receiverId": msg.recipient_id,
            "body": msg.body,
            "timestamp": msg.timestamp,
        });
        let parsed: Message = serde_json::from_value(legacy).unwrap();
        assert_eq!(parsed, msg);
    }
}
