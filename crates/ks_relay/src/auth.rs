//! Caller identity.
//!
//! Tokens are HS256 JWTs carried either as `Authorization: Bearer <jwt>` or
//! in the `jwt` cookie.  Issuers have historically put the user id in `sub`,
//! `id` or `userId`; that spelling difference is resolved here, once, into
//! a `CallerId`.  Nothing past this module ever sees a claim.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use ks_proto::UserId;
use serde::Deserialize;

use crate::error::RelayError;

const TOKEN_COOKIE: &str = "jwt";

/// A verified, non-nil caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerId(UserId);

impl CallerId {
    /// Wrap an identity that an authentication collaborator has already
    /// verified.
    pub fn verified(user_id: UserId) -> Result<Self, RelayError> {
        if user_id.is_nil() {
            return Err(RelayError::Unauthenticated);
        }
        Ok(Self(user_id))
    }

    pub fn user_id(&self) -> UserId {
        self.0
    }
}

#[derive(Debug, Deserialize)]
struct IdentityClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
}

impl IdentityClaims {
    fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.id.as_deref())
            .or(self.user_id.as_deref())
    }
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify signature and expiry, then resolve the subject.
    pub fn verify(&self, token: &str) -> Result<CallerId, RelayError> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(target: "ks_relay", error = %e, "token rejected");
            RelayError::Unauthenticated
        })?;

        let subject = data.claims.subject().ok_or(RelayError::Unauthenticated)?;
        let user_id = subject
            .parse::<UserId>()
            .map_err(|_| RelayError::Unauthenticated)?;
        CallerId::verified(user_id)
    }
}

/// Pull the raw token out of the request headers, preferring the
/// Authorization header over the cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}
