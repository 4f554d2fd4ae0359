//! Message relay operations.
//!
//! Plaintext exists only for the duration of `send`/`update`: it is sealed
//! to the recipient's current key before anything is written, and is never
//! logged.  Listing never returns ciphertext either; bodies are replaced by
//! the redaction placeholder.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use ks_crypto::{RecipientKey, SealingEngine};
use ks_proto::{Message, MessageId, UserId};
use ks_store::{MessageStore, Store, StoreError};

use crate::auth::CallerId;
use crate::error::RelayError;
use crate::registry::KeyRegistry;

#[derive(Clone)]
pub struct MessageService {
    keys: KeyRegistry,
    messages: Arc<dyn MessageStore>,
    sealer: SealingEngine,
}

impl MessageService {
    pub fn new(keys: KeyRegistry, messages: Arc<dyn MessageStore>, sealer: SealingEngine) -> Self {
        Self {
            keys,
            messages,
            sealer,
        }
    }

    /// Service backed by a single SQLite store for both keys and messages.
    pub fn with_store(store: Store, sealer: SealingEngine) -> Self {
        let store = Arc::new(store);
        Self::new(KeyRegistry::new(store.clone()), store, sealer)
    }

    /// Register or rotate the caller's own key.  Returns its fingerprint.
    pub async fn upload_key(&self, caller: CallerId, material: &str) -> Result<String, RelayError> {
        self.keys.upsert(caller.user_id(), material).await
    }

    /// Seal `body` to the recipient's current key and store it.
    pub async fn send(
        &self,
        caller: CallerId,
        recipient_id: UserId,
        body: &str,
    ) -> Result<Message, RelayError> {
        if recipient_id.is_nil() {
            return Err(RelayError::InvalidRecipient);
        }
        if body.is_empty() {
            return Err(RelayError::EmptyBody);
        }

        let key = self.recipient_key(recipient_id).await?;
        let sealed = self.sealer.seal(body.as_bytes(), &key)?;

        let message = Message {
            id: MessageId::new(),
            sender_id: caller.user_id(),
            recipient_id,
            body: sealed,
            timestamp: now_timestamp(),
        };
        self.messages.insert(&message).await?;

        tracing::info!(
            target: "ks_relay",
            event = "message_sent",
            message_id = %message.id,
            sender_id = %message.sender_id,
            recipient_id = %recipient_id,
            scheme = %self.sealer.scheme(),
        );
        Ok(message)
    }

    /// Every message the caller sent or received, newest first, bodies redacted.
    pub async fn list(&self, caller: CallerId) -> Result<Vec<Message>, RelayError> {
        let messages = self.messages.find_by_participant(caller.user_id()).await?;
        tracing::debug!(
            target: "ks_relay",
            event = "messages_listed",
            user_id = %caller.user_id(),
            count = messages.len(),
        );
        Ok(messages.into_iter().map(Message::redacted).collect())
    }

    /// Replace the body of a message the caller sent.  The new body is sealed
    /// to the recipient's key as of now, which after a rotation differs from
    /// the key the earlier body was sealed to.
    pub async fn update(
        &self,
        caller: CallerId,
        id: MessageId,
        new_body: &str,
    ) -> Result<Message, RelayError> {
        if new_body.is_empty() {
            return Err(RelayError::EmptyBody);
        }

        let record = match self.messages.find_owned(id, caller.user_id()).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => return Err(RelayError::NotFoundOrUnauthorized),
            Err(e) => return Err(RelayError::Persistence(e)),
        };

        let key = self.recipient_key(record.recipient_id).await?;
        let sealed = self.sealer.seal(new_body.as_bytes(), &key)?;

        let affected = self
            .messages
            .update_body_where(id, caller.user_id(), &sealed)
            .await?;
        if affected == 0 {
            // Deleted between the lookup and the write.
            tracing::debug!(target: "ks_relay", event = "update_lost_race", message_id = %id);
            return Err(RelayError::NotFoundOrUnauthorized);
        }

        tracing::info!(
            target: "ks_relay",
            event = "message_updated",
            message_id = %id,
            sender_id = %caller.user_id(),
        );
        Ok(Message {
            body: sealed,
            ..record
        })
    }

    /// Delete a message the caller sent.
    pub async fn delete(&self, caller: CallerId, id: MessageId) -> Result<(), RelayError> {
        let affected = self.messages.delete_where(id, caller.user_id()).await?;
        if affected == 0 {
            return Err(RelayError::NotFoundOrUnauthorized);
        }
        tracing::info!(
            target: "ks_relay",
            event = "message_deleted",
            message_id = %id,
            sender_id = %caller.user_id(),
        );
        Ok(())
    }

    async fn recipient_key(&self, recipient_id: UserId) -> Result<RecipientKey, RelayError> {
        self.keys.lookup(recipient_id).await.map_err(|e| match e {
            RelayError::KeyNotFound(id) => RelayError::RecipientKeyMissing(id),
            other => other,
        })
    }
}

/// RFC 3339 UTC with microseconds; sorts lexicographically.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_utc_micros() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'), "{ts}");
        let fraction = ts.rsplit('.').next().unwrap();
        assert_eq!(fraction.len(), "000000Z".len());
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
