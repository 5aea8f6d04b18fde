use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use contrast_core::{AnthropicBackend, ChatBackend, ModelGateway, OpenAiBackend};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContrastConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_tokens() -> u32 {
    4096
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: Option<OpenAiProviderConfig>,
    #[serde(default)]
    pub anthropic: Option<AnthropicProviderConfig>,
    /// Backend names in failover order; defaults to openai then anthropic
    #[serde(default)]
    pub failover_order: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl std::fmt::Debug for OpenAiProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProviderConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

impl std::fmt::Debug for AnthropicProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProviderConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

/// Mask a secret string for safe display in Debug output / logs.
/// Shows first 3 and last 4 chars for keys longer than 7 chars, otherwise "***".
fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".contrast")
}

impl ContrastConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path
            .clone()
            .unwrap_or_else(|| config_dir().join("config.toml"));

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `contrast init` first.",
                path.display()
            )
        })?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        if let Some(openai) = &config.providers.openai {
            if openai.api_key.starts_with("sk-") {
                warn!(
                    "OpenAI API key is hardcoded in config file. Leave it empty to read OPENAI_API_KEY from the environment."
                );
            }
        }

        Ok(config)
    }

    /// Build the failover backend chain from this config.
    ///
    /// Keys left empty in the file fall back to the conventional
    /// environment variables. Fails fast when the resulting chain would be
    /// empty so misconfiguration surfaces at startup, not on first request.
    pub fn build_gateway(&self) -> Result<ModelGateway> {
        let mut available: Vec<(&str, Box<dyn ChatBackend>)> = Vec::new();

        if let Some(openai) = &self.providers.openai {
            let api_key = resolve_key(&openai.api_key, "OPENAI_API_KEY");
            if api_key.is_empty() {
                warn!("OpenAI provider configured but no API key found, skipping");
            } else {
                available.push((
                    "openai",
                    Box::new(OpenAiBackend::new(
                        api_key,
                        openai.model.clone(),
                        openai.base_url.clone(),
                    )),
                ));
            }
        }

        if let Some(anthropic) = &self.providers.anthropic {
            let api_key = resolve_key(&anthropic.api_key, "ANTHROPIC_API_KEY");
            if api_key.is_empty() {
                warn!("Anthropic provider configured but no API key found, skipping");
            } else {
                available.push((
                    "anthropic",
                    Box::new(AnthropicBackend::new(
                        api_key,
                        anthropic.model.clone(),
                        anthropic.base_url.clone(),
                    )),
                ));
            }
        }

        let mut backends: Vec<Box<dyn ChatBackend>> = Vec::new();
        if self.providers.failover_order.is_empty() {
            backends.extend(available.into_iter().map(|(_, b)| b));
        } else {
            for name in &self.providers.failover_order {
                if let Some(idx) = available.iter().position(|(n, _)| n == name) {
                    backends.push(available.remove(idx).1);
                } else {
                    warn!("failover_order names unknown or keyless backend '{}'", name);
                }
            }
        }

        if backends.is_empty() {
            return Err(anyhow!(
                "no available backend: set an API key for at least one provider \
                 (OPENAI_API_KEY or ANTHROPIC_API_KEY, or [providers.*] in config.toml)"
            ));
        }

        info!(
            "Configured {} backend(s), primary: {}",
            backends.len(),
            backends[0].backend_name()
        );
        ModelGateway::new(backends)
    }
}

fn resolve_key(configured: &str, env_var: &str) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    std::env::var(env_var).unwrap_or_default()
}
