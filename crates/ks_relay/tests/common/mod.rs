#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ks_crypto::{SealScheme, SealingEngine};
use ks_proto::UserId;
use ks_relay::{CallerId, MessageService};
use ks_store::Store;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

/// A user with a fresh 2048-bit keypair.
pub struct Party {
    pub id: UserId,
    pub caller: CallerId,
    pub private: RsaPrivateKey,
    pub pem: String,
}

impl Party {
    pub fn new() -> Self {
        let id = UserId::new_random();
        let (private, pem) = keypair();
        Self {
            id,
            caller: CallerId::verified(id).unwrap(),
            private,
            pem,
        }
    }

    /// Open a PKCS#1 v1.5 sealed body.
    pub fn open(&self, sealed: &str) -> Vec<u8> {
        let raw = STANDARD.decode(sealed).unwrap();
        self.private.decrypt(Pkcs1v15Encrypt, &raw).unwrap()
    }

    pub fn try_open(&self, sealed: &str) -> Option<Vec<u8>> {
        let raw = STANDARD.decode(sealed).ok()?;
        self.private.decrypt(Pkcs1v15Encrypt, &raw).ok()
    }

    pub fn open_oaep(&self, sealed: &str) -> Vec<u8> {
        let raw = STANDARD.decode(sealed).unwrap();
        self.private.decrypt(Oaep::new::<Sha256>(), &raw).unwrap()
    }
}

pub fn keypair() -> (RsaPrivateKey, String) {
    let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
    let pem = RsaPublicKey::from(&private)
        .to_public_key_pem(LineEnding::LF)
        .unwrap();
    (private, pem)
}

pub async fn service() -> (MessageService, Store) {
    service_with(SealScheme::Pkcs1v15).await
}

pub async fn service_with(scheme: SealScheme) -> (MessageService, Store) {
    let store = Store::open_in_memory().await.unwrap();
    let service = MessageService::with_store(store.clone(), SealingEngine::new(scheme));
    (service, store)
}
