use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub keywords: KeywordsConfig,

    pub search: SearchConfig,

    pub browser: BrowserConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/search_results.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub csv_path: String,

    /// Candidate header names for the keyword column. The first one present
    /// in the file is used.
    pub columns: Vec<String>,

    /// Text encodings tried in order until one decodes and parses.
    pub encodings: Vec<String>,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        Self {
            csv_path: "static/02_aomori_all_20241031.csv".to_string(),
            columns: vec!["弘前検察審査会".to_string()],
            encodings: vec![
                "utf-8".to_string(),
                "shift_jis".to_string(),
                "windows-31j".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,

    /// Appended to every keyword before searching.
    pub query_suffix: String,

    /// CSS selector of one organic result container.
    pub result_selector: String,

    /// CSS selector of the link inside a result container.
    pub link_selector: String,

    pub result_wait_seconds: u64,

    /// Delay between consecutive searches of a run. Not applied before the first one.
    pub pacing_seconds: u64,

    /// Staged records are committed every `commit_every` processed keywords.
    pub commit_every: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            query_suffix: "公式サイト".to_string(),
            result_selector: "div.g".to_string(),
            link_selector: "a".to_string(),
            result_wait_seconds: 10,
            pacing_seconds: 5,
            commit_every: 5,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn result_wait(&self) -> Duration {
        Duration::from_secs(self.result_wait_seconds)
    }

    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Browser UI language, passed as `--lang`.
    pub lang: String,

    /// Explicit Chrome/Chromium binary. Auto-detected when unset.
    pub chrome_executable: Option<String>,

    pub window_width: u32,

    pub window_height: u32,

    /// Timeout for a single DevTools request (default: 30)
    pub request_timeout_seconds: u64,

    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            lang: "ja_JP".to_string(),
            chrome_executable: None,
            window_width: 1280,
            window_height: 900,
            request_timeout_seconds: 30,
            extra_args: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5001,
            cors_allowed_origins: vec![
                "http://localhost:5001".to_string(),
                "http://127.0.0.1:5001".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            keywords: KeywordsConfig::default(),
            search: SearchConfig::default(),
            browser: BrowserConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("siteseek").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".siteseek").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.commit_every == 0 {
            anyhow::bail!("search.commit_every must be > 0");
        }

        if self.search.result_wait_seconds == 0 {
            anyhow::bail!("search.result_wait_seconds must be > 0");
        }

        if self.search.result_selector.trim().is_empty()
            || self.search.link_selector.trim().is_empty()
        {
            anyhow::bail!("search.result_selector and search.link_selector cannot be empty");
        }

        if self.keywords.columns.is_empty() {
            anyhow::bail!("keywords.columns must name at least one column");
        }

        if self.keywords.encodings.is_empty() {
            anyhow::bail!("keywords.encodings must list at least one encoding");
        }

        if let Some(label) = self
            .keywords
            .encodings
            .iter()
            .find(|label| encoding_rs::Encoding::for_label(label.as_bytes()).is_none())
        {
            anyhow::bail!("Unknown keyword file encoding: {label}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.pacing_seconds, 5);
        assert_eq!(config.search.result_wait_seconds, 10);
        assert_eq!(config.search.commit_every, 5);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.browser.lang, "ja_JP");
        assert!(config.browser.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[keywords]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[browser]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            pacing_seconds = 2
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.search.pacing_seconds, 2);

        assert_eq!(config.search.commit_every, 5);
        assert_eq!(config.keywords.columns, vec!["弘前検察審査会".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.search.commit_every = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keywords.encodings = vec!["klingon-8".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keywords.columns.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.link_selector = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
