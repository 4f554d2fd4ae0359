use anyhow::Result;
use clap::Parser;
use ks_relay::config::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    ks_relay::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(storage) => {
            ks_relay::init_storage(&storage).await?;
            println!("Database ready at {}", storage.database_path.display());
            Ok(())
        }
        Commands::Run(config) => ks_relay::serve(config).await,
    }
}
