mod cleanup;
mod config;
mod llm;
mod platform;
mod prompt;
mod relay;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::llm::GeminiClient;
use crate::relay::Relay;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,translator_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing .env is fine; variables may come from the process environment
    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    // Load configuration: TOML file if given, environment otherwise
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(config_path) => {
            info!("Loading configuration from: {}", config_path.display());
            Config::load(&config_path).with_context(|| {
                format!("Failed to load config from {}", config_path.display())
            })?
        }
        None => {
            info!("Loading configuration from environment");
            Config::from_env().context("Invalid environment configuration")?
        }
    };

    info!("Configuration loaded successfully");
    info!("  Model: {}", config.gemini.model);
    info!("  Allowed users: {:?}", config.telegram.allowed_user_ids);

    let gemini = GeminiClient::new(config.gemini.clone())?;
    let relay = Arc::new(Relay::new(
        Box::new(gemini),
        config.telegram.allowed_user_ids.clone(),
    ));
    let bot = teloxide::Bot::new(&config.telegram.bot_token);

    info!("Bot is running...");
    platform::telegram::run(relay, bot).await?;

    Ok(())
}
