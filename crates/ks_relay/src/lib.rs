//! Keyseal relay: stores per-user RSA public keys and relays messages sealed
//! to the recipient's current key.
//!
//! - `registry` — per-user key registration and lookup
//! - `service`  — send / list / update / delete
//! - `auth`     — bearer/cookie token verification into a `CallerId`
//! - `http`     — axum routes and error mapping
//! - `config`   — clap CLI and environment configuration

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod service;
pub mod state;

use std::future::Future;
use std::io;

use anyhow::Context;
use ks_crypto::SealingEngine;
use ks_store::Store;

pub use auth::{CallerId, TokenVerifier};
pub use error::{ErrorKind, RelayError};
pub use registry::KeyRegistry;
pub use service::MessageService;
pub use state::AppState;

use crate::config::{RelayConfig, StorageArgs};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ks_relay=info,ks_store=info".into()),
        )
        .init();
}

/// Open (creating if needed) the database and apply migrations.
pub async fn init_storage(args: &StorageArgs) -> anyhow::Result<Store> {
    let store = Store::open(&args.database_path, args.store_options())
        .await
        .with_context(|| format!("opening database {}", args.database_path.display()))?;
    tracing::info!(
        target: "ks_relay",
        event = "storage_ready",
        path = %args.database_path.display(),
    );
    Ok(store)
}

/// Serve the API until ctrl-c.
pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    config.validate()?;
    let store = init_storage(&config.storage).await?;

    let service = MessageService::with_store(store, SealingEngine::new(config.seal_scheme));
    let verifier = TokenVerifier::hs256(config.jwt_secret.as_bytes());
    let app = http::router(AppState::new(service, verifier));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(
        target: "ks_relay",
        addr = %config.bind_addr,
        scheme = %config.seal_scheme,
        "relay started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await
        .context("serving relay")?;
    Ok(())
}

/// Resolves once `signal` fires.  If the signal handler cannot be installed
/// the error is logged and this never resolves, so the server keeps running.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!(target: "ks_relay", "shutdown requested"),
        Err(e) => {
            tracing::error!(
                target: "ks_relay",
                error = %e,
                "failed to install shutdown signal handler; serving until killed"
            );
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        tokio::time::timeout(Duration::from_secs(1), shutdown_on(async { Ok(()) }))
            .await
            .expect("shutdown should resolve once the signal fires");
    }

    #[tokio::test]
    async fn failed_signal_registration_keeps_serving() {
        let failing = async { Err(io::Error::new(io::ErrorKind::Other, "no signal support")) };
        let outcome = tokio::time::timeout(Duration::from_millis(100), shutdown_on(failing)).await;
        assert!(outcome.is_err(), "shutdown must not resolve when the handler failed");
    }
}
