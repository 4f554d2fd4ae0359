//! Recipient public keys
//!
//! One key family is supported: RSA. Keys arrive as self-describing PEM,
//! either SubjectPublicKeyInfo (`-----BEGIN PUBLIC KEY-----`) or PKCS#1
//! (`-----BEGIN RSA PUBLIC KEY-----`). Anything that does not decode into
//! an RSA public key of at least `MIN_MODULUS_BITS` is rejected.

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::error::CryptoError;

/// Smallest accepted modulus.
pub const MIN_MODULUS_BITS: usize = 2048;

const PKCS1_LABEL: &str = "-----BEGIN RSA PUBLIC KEY-----";

/// A parsed, size-checked recipient public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientKey {
    inner: RsaPublicKey,
}

impl RecipientKey {
    /// Parse PEM text into a recipient key.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let pem = pem.trim();
        if pem.is_empty() {
            return Err(CryptoError::KeyFormat("empty key material".into()));
        }

        let inner = if pem.starts_with(PKCS1_LABEL) {
            RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| CryptoError::KeyFormat(e.to_string()))?
        } else {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| CryptoError::KeyFormat(e.to_string()))?
        };

        let bits = inner.n().bits();
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::WeakKey {
                bits,
                min_bits: MIN_MODULUS_BITS,
            });
        }
        Ok(Self { inner })
    }

    /// Modulus size in bytes.
    pub fn modulus_len(&self) -> usize {
        self.inner.size()
    }

    pub fn modulus_bits(&self) -> usize {
        self.inner.n().bits()
    }

    pub(crate) fn as_rsa(&self) -> &RsaPublicKey {
        &self.inner
    }

    /// Human-readable fingerprint: BLAKE3 over (n, e), truncated to
    /// 20 bytes (160 bits), hex-encoded in groups of 4.
    ///
    /// Example: "a1b2 c3d4 e5f6 7890 abcd ef01 2345 6789 0abc def0"
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"ks-key-fp-v1\x00");
        hasher.update(&self.inner.n().to_bytes_be());
        hasher.update(b"\x00");
        hasher.update(&self.inner.e().to_bytes_be());
        let hash = hasher.finalize();
        let hex = hex::encode(&hash.as_bytes()[..20]);
        hex.chars()
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|c| c.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
