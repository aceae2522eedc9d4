use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS; empty means permissive
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://didxa-link.vercel.app".to_string(),
        "http://localhost:4321".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "supabase" or "memory"
    #[serde(default = "default_store_kind")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// JSON seed file for the memory store
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default = "default_words_table")]
    pub words: TableConfig,
    #[serde(default = "default_phrases_table")]
    pub phrases: TableConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub table: String,
    pub source_column: String,
    pub target_column: String,
}

fn default_store_kind() -> String {
    "supabase".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_words_table() -> TableConfig {
    TableConfig {
        table: "translations".to_string(),
        source_column: "spanish_word".to_string(),
        target_column: "zapotec_word".to_string(),
    }
}

fn default_phrases_table() -> TableConfig {
    TableConfig {
        table: "phrases".to_string(),
        source_column: "spanish_phrase".to_string(),
        target_column: "zapotec_phrase".to_string(),
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: default_store_kind(),
            url: String::new(),
            service_key: String::new(),
            timeout_ms: default_timeout_ms(),
            seed_path: None,
            words: default_words_table(),
            phrases: default_phrases_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Window length past which a missed phrase falls back to a single word
    #[serde(default = "default_phrase_threshold")]
    pub phrase_threshold: usize,
}

fn default_phrase_threshold() -> usize {
    4
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            phrase_threshold: default_phrase_threshold(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = substitute_env_vars(&fs::read_to_string(path)?);

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        let config: Config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.translator.phrase_threshold == 0 {
            anyhow::bail!("translator.phrase_threshold must be at least 1");
        }
        if self.cache.sweep_interval_secs == 0 {
            anyhow::bail!("cache.sweep_interval_secs must be positive");
        }
        if self.store.kind == "supabase" && !self.store.url.starts_with("http") {
            anyhow::bail!(
                "store.url must be an http(s) URL for the supabase store, got {:?}",
                self.store.url
            );
        }
        Ok(())
    }
}

/// Replace `${VAR_NAME}` with the environment value, leaving unknown variables untouched
fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("valid env var pattern");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
