//! Command line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ks_crypto::SealScheme;
use ks_store::StoreOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keyseal message relay", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply migrations, then exit
    Init(StorageArgs),
    /// Serve the relay API
    Run(RelayConfig),
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    #[arg(long, env = "KS_DATABASE_PATH", default_value = "keyseal.db")]
    pub database_path: PathBuf,

    /// Seconds a writer waits on a locked database before failing
    #[arg(long, env = "KS_BUSY_TIMEOUT_SECS", default_value_t = 5)]
    pub busy_timeout_secs: u64,
}

impl StorageArgs {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: Duration::from_secs(self.busy_timeout_secs),
            ..StoreOptions::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RelayConfig {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[arg(long, env = "KS_BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: SocketAddr,

    /// HS256 secret shared with the token issuer
    #[arg(long, env = "KS_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// pkcs1v15 or oaep-sha256
    #[arg(long, env = "KS_SEAL_SCHEME", default_value = "pkcs1v15")]
    pub seal_scheme: SealScheme,
}

impl RelayConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.jwt_secret.trim().is_empty(),
            "KS_JWT_SECRET must not be empty"
        );
        anyhow::ensure!(
            self.storage.busy_timeout_secs > 0,
            "KS_BUSY_TIMEOUT_SECS must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config(args: &[&str]) -> RelayConfig {
        let argv = ["ks-relay", "run"].iter().chain(args.iter()).copied();
        match Cli::try_parse_from(argv).expect("parse").command {
            Commands::Run(cfg) => cfg,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let cfg = run_config(&["--jwt-secret", "s3cret"]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cfg.seal_scheme, SealScheme::Pkcs1v15);
        assert_eq!(cfg.storage.store_options().busy_timeout, Duration::from_secs(5));
        cfg.validate().unwrap();
    }

    #[test]
    fn scheme_and_storage_flags_parse() {
        let cfg = run_config(&[
            "--jwt-secret",
            "s3cret",
            "--seal-scheme",
            "oaep-sha256",
            "--database-path",
            "/tmp/relay.db",
            "--busy-timeout-secs",
            "12",
        ]);
        assert_eq!(cfg.seal_scheme, SealScheme::OaepSha256);
        assert_eq!(cfg.storage.database_path, PathBuf::from("/tmp/relay.db"));
        assert_eq!(cfg.storage.busy_timeout_secs, 12);
    }

    #[test]
    fn unknown_scheme_is_a_parse_error() {
        let argv = ["ks-relay", "run", "--jwt-secret", "x", "--seal-scheme", "rot13"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn blank_secret_fails_validation() {
        let cfg = run_config(&["--jwt-secret", "   "]);
        assert!(cfg.validate().is_err());
    }
}
