//! intent-bridge CLI
//!
//! Runs one intent through the bridge and prints the response as JSON.
//! Logs go to stderr; set `RUST_LOG` to change the level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use intent_bridge::{BridgeConfig, IntentBridge};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intent-bridge")]
#[command(about = "Turn plain-language intents into API calls", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "INTENT_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and execute an intent
    Run {
        /// Intent text, e.g. "get weather in Paris"
        intent: String,
        /// Never call live APIs
        #[arg(long)]
        mock: bool,
    },

    /// List registered APIs
    Apis {
        /// Output format: text (default), json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show learning statistics
    Stats,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intent_bridge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<BridgeConfig> {
    let config = match path {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    Ok(config.apply_env()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run { intent, mock } => {
            if mock {
                config.executor.force_mock = true;
            }
            let bridge = IntentBridge::from_config(config).await?;
            let response = bridge.execute(&intent).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Apis { format } => {
            let bridge = IntentBridge::from_config(config).await?;
            let entries = bridge.registry().entries();

            if format == "json" {
                let apis: serde_json::Map<String, serde_json::Value> = entries
                    .into_iter()
                    .map(|(key, name)| (key, serde_json::Value::String(name)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&apis)?);
            } else {
                println!("{:<16} {}", "Key", "Name");
                println!("{}", "-".repeat(40));
                for (key, name) in entries {
                    println!("{:<16} {}", key, name);
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let bridge = IntentBridge::from_config(config).await?;
            println!("{}", serde_json::to_string_pretty(&bridge.get_stats())?);
            Ok(())
        }
    }
}
