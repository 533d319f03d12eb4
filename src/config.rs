use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default)]
    pub allowed_user_ids: HashSet<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Parse a comma-separated list of numeric user ids. Blank entries are skipped.
/// Negative ids (group chats) are accepted even though no user can match them.
pub fn parse_allowed_user_ids(raw: &str) -> Result<HashSet<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>().with_context(|| {
                format!(
                    "ALLOWED_USER_IDS must be a comma-separated list of integers (got {:?})",
                    id
                )
            })
        })
        .collect()
}

impl Config {
    /// Read configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = lookup("MODELAI").unwrap_or_default();
        if model.trim().is_empty() {
            bail!(
                "MODELAI environment variable must be set to a valid model name (e.g. 'gemini-1.5-flash')"
            );
        }

        let allowed_user_ids = parse_allowed_user_ids(&lookup("ALLOWED_USER_IDS").unwrap_or_default())?;

        let timeout_secs = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS must be an integer (got {:?})", raw))?,
            _ => default_timeout_secs(),
        };

        let config = Config {
            telegram: TelegramConfig {
                bot_token: lookup("BOT_TOKEN").unwrap_or_default(),
                allowed_user_ids,
            },
            gemini: GeminiConfig {
                api_key: lookup("GOOGLE_API_KEY").unwrap_or_default(),
                model: model.trim().to_string(),
                base_url: lookup("GEMINI_BASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(default_base_url),
                timeout_secs,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() || self.gemini.api_key.trim().is_empty() {
            bail!("Both BOT_TOKEN and GOOGLE_API_KEY must be set");
        }
        if self.gemini.model.trim().is_empty() {
            bail!("A model name must be configured (e.g. 'gemini-1.5-flash')");
        }
        if self.gemini.timeout_secs == 0 {
            bail!("The Gemini request timeout must be greater than zero");
        }
        Ok(())
    }
}
