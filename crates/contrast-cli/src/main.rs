use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::ContrastConfig;
use contrast_core::{ComparisonEngine, ComparisonRequest};
use contrast_server::ApiServer;

#[derive(Parser)]
#[command(name = "contrast")]
#[command(version)]
#[command(about = "contrast — LLM-backed report comparison service")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Compare two report files and print the result JSON
    Compare {
        /// Path to the first report
        report1: PathBuf,

        /// Path to the second report
        report2: PathBuf,

        /// Custom comparison instruction (defaults to a generic one)
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Initialize the config directory and default config
    Init,

    /// Show the effective configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Compare {
            report1,
            report2,
            prompt,
        } => cmd_compare(&cli.config, &report1, &report2, prompt).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        println!("Created default config at {}", config_path.display());
    }

    println!("Set OPENAI_API_KEY (and optionally ANTHROPIC_API_KEY) or edit the config.");
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let config = ContrastConfig::load(config_path)?;
    println!("{:#?}", config);
    Ok(())
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let config = ContrastConfig::load(config_path)?;
    let engine = build_engine(&config)?;

    let bind = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    info!("Starting contrast on {}", bind);
    ApiServer::new(bind, engine).run().await
}

async fn cmd_compare(
    config_path: &Option<PathBuf>,
    report1_path: &PathBuf,
    report2_path: &PathBuf,
    prompt: Option<String>,
) -> Result<()> {
    let config = ContrastConfig::load(config_path)?;
    let engine = build_engine(&config)?;

    let report1 = tokio::fs::read_to_string(report1_path)
        .await
        .with_context(|| format!("Failed to read {}", report1_path.display()))?;
    let report2 = tokio::fs::read_to_string(report2_path)
        .await
        .with_context(|| format!("Failed to read {}", report2_path.display()))?;

    let request = ComparisonRequest {
        report1,
        report2,
        custom_prompt: prompt,
    };
    let result = engine.compare(&request).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_engine(config: &ContrastConfig) -> Result<Arc<ComparisonEngine>> {
    let gateway = config.build_gateway()?;
    Ok(Arc::new(ComparisonEngine::new(
        gateway,
        config.comparison.max_tokens,
    )))
}
