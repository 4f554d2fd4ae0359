//! Public-key rows: one current key per user.

use async_trait::async_trait;
use chrono::Utc;
use ks_proto::UserId;

use crate::db::Store;
use crate::error::StoreError;
use crate::models::UserKeyRow;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Store or replace the key for `user_id` in one atomic statement.
    async fn upsert_key(&self, user_id: UserId, public_key: &str) -> Result<(), StoreError>;

    /// Current key for `user_id`, or `StoreError::NotFound`.
    async fn fetch_key(&self, user_id: UserId) -> Result<UserKeyRow, StoreError>;
}

#[async_trait]
impl KeyStore for Store {
    async fn upsert_key(&self, user_id: UserId, public_key: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_keys (user_id, public_key, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET
                public_key = excluded.public_key,
                updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(public_key)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_key(&self, user_id: UserId) -> Result<UserKeyRow, StoreError> {
        sqlx::query_as::<_, UserKeyRow>(
            "SELECT user_id, public_key, updated_at FROM user_keys WHERE user_id = ? LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("public key for user {user_id}")))
    }
}
