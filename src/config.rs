//! TOML configuration.
//!
//! Every section carries defaults, so an empty file (or no file at all, via
//! [`Config::default`]) yields a working local setup pointed at
//! `http://localhost:9200/health_docs`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `[index].host`.
pub const INDEX_HOST_ENV: &str = "HSEARCH_INDEX_HOST";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_index_name")]
    pub name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            name: default_index_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "http://localhost:9200".to_string()
}
fn default_index_name() -> String {
    "health_docs".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
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
    "127.0.0.1:4000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Page size the browse session requests from the list endpoint.
    /// Values below the endpoint minimum of 5 are raised to 5.
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_per_page: default_results_per_page(),
        }
    }
}

fn default_results_per_page() -> u64 {
    5
}

impl Config {
    /// Applies environment overrides on top of file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var(INDEX_HOST_ENV) {
            if !host.trim().is_empty() {
                self.index.host = host.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.host.trim().is_empty() {
            anyhow::bail!("index.host must not be empty");
        }
        if self.index.name.trim().is_empty() {
            anyhow::bail!("index.name must not be empty");
        }
        if self.index.timeout_secs == 0 {
            anyhow::bail!("index.timeout_secs must be > 0");
        }
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        if self.search.results_per_page < 1 {
            anyhow::bail!("search.results_per_page must be >= 1");
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?.with_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.index.host, "http://localhost:9200");
        assert_eq!(cfg.index.name, "health_docs");
        assert_eq!(cfg.index.timeout_secs, 30);
        assert_eq!(cfg.server.bind, "127.0.0.1:4000");
        assert_eq!(cfg.search.results_per_page, 5);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[index]
name = "who_guidance"

[search]
results_per_page = 10
"#,
        )
        .unwrap();
        assert_eq!(cfg.index.name, "who_guidance");
        assert_eq!(cfg.index.host, "http://localhost:9200");
        assert_eq!(cfg.search.results_per_page, 10);
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse_config("[index]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let err = parse_config("[search]\nresults_per_page = 0\n").unwrap_err();
        assert!(err.to_string().contains("results_per_page"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(parse_config("[index\nname = ").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind = \"0.0.0.0:8080\"").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/hsearch.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hsearch.toml"));
    }
}
