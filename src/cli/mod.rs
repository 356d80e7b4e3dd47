use crate::config::AppConfig;
use crate::errors::AppResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// CoinSpark metadata encoder and decoder
#[derive(Parser)]
#[command(name = "coinspark")]
#[command(about = "Encode and decode CoinSpark metadata, addresses and hashes")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to coinspark.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Decode metadata or an OP_RETURN script
    Decode(commands::decode::DecodeCommand),
    /// Encode a genesis, transfer list, payment reference or message
    Encode(commands::encode::EncodeCommand),
    /// Encode or decode a CoinSpark address
    Address(commands::address::AddressCommand),
    /// Compute an asset hash from contract fields
    AssetHash(commands::hash::AssetHashCommand),
    /// Compute a message hash from salt and content parts
    MessageHash(commands::hash::MessageHashCommand),
    /// Show the effective configuration
    Config(commands::show_config::ShowConfigCommand),
}

pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path, true)?,
        None => AppConfig::get_defaults(),
    };

    // RUST_LOG takes precedence over the configured filter
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .try_init();

    match cli.command {
        Commands::Decode(command) => command.run(&config),
        Commands::Encode(command) => command.run(&config),
        Commands::Address(command) => command.run(&config),
        Commands::AssetHash(command) => command.run(&config),
        Commands::MessageHash(command) => command.run(&config),
        Commands::Config(command) => command.run(&config),
    }
}
