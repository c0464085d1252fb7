//! Harmonizer server binary
//!
//! Serves the rule extraction API.

use anyhow::Context;
use clap::Parser;
use harmonizer_server::{config::ServerConfig, start_server};
use std::path::PathBuf;

/// Harmonizer - extract governance rules from text and documents.
#[derive(Debug, Parser)]
#[command(name = "harmonizer-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults to a local Ollama setup
    #[arg(short, long, env = "HARMONIZER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            eprintln!("Warning: No config file specified, using local Ollama defaults");
            eprintln!("Usage: harmonizer-server --config <path-to-config.toml>");
            ServerConfig::default_local_config()
        }
    };

    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
