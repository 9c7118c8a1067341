//! Typed configuration, loaded from a TOML file with defaults for anything
//! absent or missing entirely.

use serde::{Deserialize, Serialize};

/// Transport run mode. `Both` auto-selects stdio vs. HTTP based on whether
/// stdin is a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Stdio,
    Http,
    Both,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Both
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub mode: TransportMode,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: TransportMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiModelConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key, not the key
    /// itself.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_openai_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for OpenAiModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaModelConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_ollama_url() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_model() -> String {
    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3".to_string())
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub openai: OpenAiModelConfig,
    #[serde(default)]
    pub ollama: OllamaModelConfig,
    /// Which binding the adapter should call by default; agents may still
    /// override with their own `model_name`.
    #[serde(default = "default_provider")]
    pub default_provider: String,
}

fn default_provider() -> String {
    "ollama".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmSectionConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub enable_memory: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub stream: bool,
}

fn default_max_turns() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for SwarmSectionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            timeout_secs: default_timeout_secs(),
            enable_memory: true,
            debug: false,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub swarm: SwarmSectionConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Fall back to defaults (still environment-variable aware per-field)
    /// when no config file is present — a one-tool CLI shouldn't require one.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
