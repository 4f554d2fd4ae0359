//! Message rows.
//!
//! Mutations are ownership-scoped: the `(id, sender_id)` predicate is part
//! of the single UPDATE/DELETE statement, so a concurrent update and delete
//! on the same row resolve to one winner and the loser sees zero rows.

use async_trait::async_trait;
use ks_proto::{Message, MessageId, UserId};

use crate::db::Store;
use crate::error::StoreError;
use crate::models::MessageRow;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new record.  `message.id` must be fresh.
    async fn insert(&self, message: &Message) -> Result<(), StoreError>;

    /// Snapshot of every message sent or received by `user_id`, newest first.
    async fn find_by_participant(&self, user_id: UserId) -> Result<Vec<Message>, StoreError>;

    /// Delete `id` only if `sender_id` sent it.  Returns rows affected.
    async fn delete_where(&self, id: MessageId, sender_id: UserId) -> Result<u64, StoreError>;

    /// Replace the body of `id` only if `sender_id` sent it.  Returns rows
    /// affected; every other column is left untouched.
    async fn update_body_where(
        &self,
        id: MessageId,
        sender_id: UserId,
        new_body: &str,
    ) -> Result<u64, StoreError>;

    /// The record `id` if `sender_id` sent it, else `StoreError::NotFound`.
    async fn find_owned(&self, id: MessageId, sender_id: UserId) -> Result<Message, StoreError>;
}

#[async_trait]
impl MessageStore for Store {
    async fn insert(&self, message: &Message) -> Result<(), StoreError> {
        let row = MessageRow::from(message);
        sqlx::query(
            "INSERT INTO messages (id, sender_id, recipient_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.sender_id)
        .bind(&row.recipient_id)
        .bind(&row.body)
        .bind(&row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_participant(&self, user_id: UserId) -> Result<Vec<Message>, StoreError> {
        let user = user_id.to_string();
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, sender_id, recipient_id, body, created_at FROM messages
             WHERE sender_id = ? OR recipient_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(&user)
        .bind(&user)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn delete_where(&self, id: MessageId, sender_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ? AND sender_id = ?")
            .bind(id.to_string())
            .bind(sender_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_body_where(
        &self,
        id: MessageId,
        sender_id: UserId,
        new_body: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE messages SET body = ? WHERE id = ? AND sender_id = ?")
            .bind(new_body)
            .bind(id.to_string())
            .bind(sender_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_owned(&self, id: MessageId, sender_id: UserId) -> Result<Message, StoreError> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, sender_id, recipient_id, body, created_at FROM messages
             WHERE id = ? AND sender_id = ? LIMIT 1",
        )
        .bind(id.to_string())
        .bind(sender_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::NotFound(format!("message {id}")))
            .and_then(Message::try_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: UserId, recipient: UserId, body: &str, ts: &str) -> Message {
        Message {
            id: MessageId::new(),
            sender_id: sender,
            recipient_id: recipient,
            body: body.into(),
            timestamp: ts.into(),
        }
    }

    async fn count(store: &Store, id: MessageId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&store.pool)
            .await
            .expect("count")
    }

    #[tokio::test]
    async fn find_by_participant_filters_and_orders_newest_first() {
        let store = Store::open_in_memory().await.expect("open store");
        let (alice, bob, carol) = (UserId::new_random(), UserId::new_random(), UserId::new_random());

        let oldest = message(alice, bob, "c1", "2024-05-01T10:00:00.000001Z");
        let middle = message(bob, alice, "c2", "2024-05-01T10:00:00.000002Z");
        let newest = message(alice, carol, "c3", "2024-05-01T10:00:00.000003Z");
        let unrelated = message(bob, carol, "c4", "2024-05-01T10:00:00.000004Z");
        for m in [&middle, &unrelated, &oldest, &newest] {
            store.insert(m).await.expect("insert");
        }

        let listed = store.find_by_participant(alice).await.expect("list");
        let ids: Vec<_> = listed.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
        assert!(listed
            .iter()
            .all(|m| m.sender_id == alice || m.recipient_id == alice));

        let carol_sees = store.find_by_participant(carol).await.expect("list");
        assert_eq!(carol_sees.len(), 2);
        assert!(store.find_by_participant(UserId::new_random()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_requires_matching_sender() {
        let store = Store::open_in_memory().await.expect("open store");
        let (alice, bob) = (UserId::new_random(), UserId::new_random());
        let msg = message(alice, bob, "sealed", "2024-05-01T10:00:00.000000Z");
        store.insert(&msg).await.unwrap();

        // The recipient cannot delete it, and neither can a bogus id.
        assert_eq!(store.delete_where(msg.id, bob).await.unwrap(), 0);
        assert_eq!(store.delete_where(MessageId::new(), alice).await.unwrap(), 0);
        assert_eq!(count(&store, msg.id).await, 1);

        assert_eq!(store.delete_where(msg.id, alice).await.unwrap(), 1);
        assert_eq!(count(&store, msg.id).await, 0);
        assert_eq!(store.delete_where(msg.id, alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_body_requires_matching_sender_and_touches_only_body() {
        let store = Store::open_in_memory().await.expect("open store");
        let (alice, bob) = (UserId::new_random(), UserId::new_random());
        let msg = message(alice, bob, "sealed-1", "2024-05-01T10:00:00.000000Z");
        store.insert(&msg).await.unwrap();

        assert_eq!(store.update_body_where(msg.id, bob, "hijack").await.unwrap(), 0);
        assert_eq!(store.update_body_where(msg.id, alice, "sealed-2").await.unwrap(), 1);

        let stored = store.find_owned(msg.id, alice).await.unwrap();
        assert_eq!(stored.body, "sealed-2");
        assert_eq!(stored.sender_id, msg.sender_id);
        assert_eq!(stored.recipient_id, msg.recipient_id);
        assert_eq!(stored.timestamp, msg.timestamp);
    }

    #[tokio::test]
    async fn find_owned_hides_other_senders_rows() {
        let store = Store::open_in_memory().await.expect("open store");
        let (alice, bob) = (UserId::new_random(), UserId::new_random());
        let msg = message(alice, bob, "sealed", "2024-05-01T10:00:00.000000Z");
        store.insert(&msg).await.unwrap();

        assert_eq!(store.find_owned(msg.id, alice).await.unwrap(), msg);
        assert!(matches!(
            store.find_owned(msg.id, bob).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.find_owned(MessageId::new(), alice).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = Store::open_in_memory().await.expect("open store");
        let msg = message(UserId::new_random(), UserId::new_random(), "x", "2024-05-01T10:00:00.000000Z");
        store.insert(&msg).await.unwrap();
        assert!(matches!(
            store.insert(&msg).await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn malformed_rows_surface_as_invalid_row() {
        let store = Store::open_in_memory().await.expect("open store");
        let alice = UserId::new_random();
        sqlx::query(
            "INSERT INTO messages (id, sender_id, recipient_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("not-a-uuid")
        .bind(alice.to_string())
        .bind(UserId::new_random().to_string())
        .bind("x")
        .bind("2024-05-01T10:00:00.000000Z")
        .execute(&store.pool)
        .await
        .unwrap();

        assert!(matches!(
            store.find_by_participant(alice).await,
            Err(StoreError::InvalidRow(_))
        ));
    }
}
