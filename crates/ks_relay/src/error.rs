//! Relay error taxonomy.
//!
//! Every failure reaches the caller as a distinct variant.  `kind()` groups
//! them the way clients should react: validation and key problems need the
//! caller (or the recipient) to act, persistence and primitive failures
//! are ours and may be retried.

use ks_crypto::CryptoError;
use ks_proto::UserId;
use ks_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    Key,
    Sealing,
    Persistence,
}

#[derive(Debug, Error)]
pub enum RelayError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("recipientId missing or invalid")]
    InvalidRecipient,

    #[error("message body is empty")]
    EmptyBody,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // ── Authorization ────────────────────────────────────────────────────────
    /// Missing, invalid or nil caller identity.
    #[error("caller identity missing or invalid")]
    Unauthenticated,

    /// Deliberately ambiguous: the id does not exist, or the caller did not send it.
    #[error("message not found or not authorized")]
    NotFoundOrUnauthorized,

    // ── Keys ─────────────────────────────────────────────────────────────────
    #[error("no public key on file for user {0}")]
    KeyNotFound(UserId),

    #[error("recipient {0} has no public key on file")]
    RecipientKeyMissing(UserId),

    #[error("invalid public key: {0}")]
    InvalidKeyMaterial(String),

    // ── Sealing ──────────────────────────────────────────────────────────────
    #[error("stored public key is unusable: {0}")]
    KeyFormat(String),

    #[error("message too large: {len} bytes, recipient key allows {max}")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    // ── Persistence ──────────────────────────────────────────────────────────
    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRecipient | Self::EmptyBody | Self::InvalidRequest(_) => {
                ErrorKind::Validation
            }
            Self::Unauthenticated | Self::NotFoundOrUnauthorized => ErrorKind::Authorization,
            Self::KeyNotFound(_) | Self::RecipientKeyMissing(_) | Self::InvalidKeyMaterial(_) => {
                ErrorKind::Key
            }
            Self::KeyFormat(_) | Self::PlaintextTooLarge { .. } | Self::Encryption(_) => {
                ErrorKind::Sealing
            }
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// True when the request itself is at fault and resending it unchanged
    /// cannot succeed.
    pub fn is_client_fault(&self) -> bool {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Authorization | ErrorKind::Key => true,
            ErrorKind::Sealing => matches!(self, Self::PlaintextTooLarge { .. }),
            ErrorKind::Persistence => false,
        }
    }

    /// True for transient server-side failures the caller may retry.
    /// Note a retried send can duplicate a message: there is no idempotency key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Encryption(_) | Self::Persistence(_))
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRecipient => "INVALID_RECIPIENT",
            Self::EmptyBody => "EMPTY_BODY",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotFoundOrUnauthorized => "NOT_FOUND_OR_UNAUTHORIZED",
            Self::KeyNotFound(_) => "KEY_NOT_FOUND",
            Self::RecipientKeyMissing(_) => "RECIPIENT_KEY_MISSING",
            Self::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            Self::KeyFormat(_) => "KEY_FORMAT",
            Self::PlaintextTooLarge { .. } => "PLAINTEXT_TOO_LARGE",
            Self::Encryption(_) => "ENCRYPTION_FAILED",
            Self::Persistence(_) => "PERSISTENCE",
        }
    }

    /// Message safe to show a client.  Server faults never echo internals.
    pub fn public_message(&self) -> String {
        match self {
            Self::KeyFormat(_) | Self::Encryption(_) => "Failed to seal message".to_string(),
            Self::Persistence(_) => "Storage unavailable, try again later".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<CryptoError> for RelayError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::PlaintextTooLarge { len, max } => Self::PlaintextTooLarge { len, max },
            CryptoError::KeyFormat(_) | CryptoError::WeakKey { .. } => {
                Self::KeyFormat(err.to_string())
            }
            CryptoError::Encryption(msg) => Self::Encryption(msg),
            CryptoError::UnknownScheme(_) => Self::Encryption(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_taxonomy() {
        let user = UserId::new_random();
        let cases = [
            (RelayError::EmptyBody, ErrorKind::Validation, true, false),
            (RelayError::InvalidRecipient, ErrorKind::Validation, true, false),
            (RelayError::NotFoundOrUnauthorized, ErrorKind::Authorization, true, false),
            (RelayError::RecipientKeyMissing(user), ErrorKind::Key, true, false),
            (RelayError::InvalidKeyMaterial("x".into()), ErrorKind::Key, true, false),
            (
                RelayError::PlaintextTooLarge { len: 246, max: 245 },
                ErrorKind::Sealing,
                true,
                false,
            ),
            (RelayError::Encryption("rng".into()), ErrorKind::Sealing, false, true),
            (RelayError::KeyFormat("bad".into()), ErrorKind::Sealing, false, false),
            (
                RelayError::Persistence(StoreError::Migration("down".into())),
                ErrorKind::Persistence,
                false,
                true,
            ),
        ];
        for (err, kind, client, retry) in cases {
            assert_eq!(err.kind(), kind, "{err}");
            assert_eq!(err.is_client_fault(), client, "{err}");
            assert_eq!(err.is_retryable(), retry, "{err}");
        }
    }

    #[test]
    fn crypto_errors_map_to_sealing_variants() {
        let too_large: RelayError = CryptoError::PlaintextTooLarge { len: 300, max: 245 }.into();
        assert!(matches!(too_large, RelayError::PlaintextTooLarge { len: 300, max: 245 }));

        let weak: RelayError = CryptoError::WeakKey { bits: 1024, min_bits: 2048 }.into();
        assert!(matches!(weak, RelayError::KeyFormat(_)));

        let prim: RelayError = CryptoError::Encryption("entropy".into()).into();
        assert!(matches!(prim, RelayError::Encryption(_)));
    }

    #[test]
    fn server_faults_do_not_leak_details() {
        let err = RelayError::Persistence(StoreError::NotFound("secret table".into()));
        assert!(!err.public_message().contains("secret"));
        let err = RelayError::KeyFormat("asn1 tag 0x30".into());
        assert!(!err.public_message().contains("asn1"));
    }
}
