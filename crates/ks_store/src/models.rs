//! Database row models — these map to/from SQL rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ks_proto::{Message, MessageId, UserId};

use crate::error::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserKeyRow {
    pub user_id: String,
    /// PEM public key exactly as uploaded.
    pub public_key: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    /// Sealed body (base64 ciphertext).
    pub body: String,
    pub created_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: parse_column::<MessageId>(&row.id, "id", &row.id)?,
            sender_id: parse_column::<UserId>(&row.id, "sender_id", &row.sender_id)?,
            recipient_id: parse_column::<UserId>(&row.id, "recipient_id", &row.recipient_id)?,
            body: row.body,
            timestamp: row.created_at,
        })
    }
}

fn parse_column<T>(row_id: &str, column: &str, value: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::InvalidRow(format!("message {row_id}: bad {column}: {e}")))
}

impl From<&Message> for MessageRow {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id.to_string(),
            sender_id: msg.sender_id.to_string(),
            recipient_id: msg.recipient_id.to_string(),
            body: msg.body.clone(),
            created_at: msg.timestamp.clone(),
        }
    }
}
