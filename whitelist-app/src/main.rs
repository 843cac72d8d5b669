//! Intersection Whitelist Application
//!
//! Fetches CoinGecko market caps and exchange 24h volumes, writes the merged
//! whitelist to JSON and prints a short summary.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use whitelist_core::{save_json, text_summary, DataFeedManager, WhitelistConfig, WhitelistGenerator};

#[derive(Parser, Debug)]
#[command(name = "intersection-whitelist")]
#[command(about = "Market cap ∩ volume whitelist generator", long_about = None)]
struct Cli {
    /// JSON config file; defaults apply to anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read saved provider payloads (coingecko.json, binance.json, ...) from this directory instead of HTTP
    #[arg(long)]
    replay_dir: Option<PathBuf>,

    /// Number of pairs to print in the summary
    #[arg(long)]
    show: Option<usize>,

    /// Log level when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Config file (or defaults) with command line overrides applied
    fn load_config(&self) -> Result<WhitelistConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("📄 Loading config from {}", path.display());
                WhitelistConfig::from_file(path)?
            }
            None => WhitelistConfig::default(),
        };

        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(show) = self.show {
            config.display_limit = show;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .init();

    if let Err(e) = run(&cli).await {
        error!("❌ Whitelist generation failed: {}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    let feeds = match &cli.replay_dir {
        Some(dir) => {
            info!("🔁 Replaying saved payloads from {}", dir.display());
            DataFeedManager::replay(dir, &config)
        }
        None => DataFeedManager::from_config(&config)?,
    };

    let generator = WhitelistGenerator::new(config);
    let whitelist = generator.generate(&feeds).await?;

    let config = generator.config();
    save_json(&whitelist, &config.output_path)?;
    println!("{}", text_summary(&whitelist, &config.output_path, config.display_limit));

    Ok(())
}
