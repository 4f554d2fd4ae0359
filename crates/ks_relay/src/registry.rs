//! Per-user public key registry.

use std::sync::Arc;

use ks_crypto::RecipientKey;
use ks_proto::UserId;
use ks_store::{KeyStore, StoreError};

use crate::error::RelayError;

#[derive(Clone)]
pub struct KeyRegistry {
    store: Arc<dyn KeyStore>,
}

impl KeyRegistry {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Register or rotate `user_id`'s key.  The material is parsed before any
    /// write, so a bad upload never replaces a working key.  Returns the key
    /// fingerprint.
    pub async fn upsert(&self, user_id: UserId, material: &str) -> Result<String, RelayError> {
        if user_id.is_nil() {
            return Err(RelayError::Unauthenticated);
        }
        if material.trim().is_empty() {
            return Err(RelayError::InvalidKeyMaterial("public key is empty".into()));
        }
        let key = RecipientKey::from_pem(material)
            .map_err(|e| RelayError::InvalidKeyMaterial(e.to_string()))?;
        let fingerprint = key.fingerprint();

        self.store.upsert_key(user_id, material).await?;

        tracing::info!(
            target: "ks_relay",
            event = "key_upserted",
            user_id = %user_id,
            fingerprint = %fingerprint,
            modulus_bits = key.modulus_bits(),
        );
        Ok(fingerprint)
    }

    /// Current key for `user_id`.
    pub async fn lookup(&self, user_id: UserId) -> Result<RecipientKey, RelayError> {
        let row = match self.store.fetch_key(user_id).await {
            Ok(row) => row,
            Err(StoreError::NotFound(_)) => return Err(RelayError::KeyNotFound(user_id)),
            Err(e) => return Err(RelayError::Persistence(e)),
        };
        RecipientKey::from_pem(&row.public_key).map_err(RelayError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ks_store::Store;

    async fn registry() -> (KeyRegistry, Store) {
        let store = Store::open_in_memory().await.expect("open store");
        (KeyRegistry::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn nil_identity_cannot_register_a_key() {
        let (registry, store) = registry().await;

        let err = registry
            .upsert(UserId::default(), "-----BEGIN PUBLIC KEY-----")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Unauthenticated));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_keys")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn lookup_of_unknown_user_is_key_not_found() {
        let (registry, _) = registry().await;
        let user = UserId::new_random();
        assert!(matches!(
            registry.lookup(user).await,
            Err(RelayError::KeyNotFound(id)) if id == user
        ));
    }
}
