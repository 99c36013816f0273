use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::infrastructure::abi::DEFAULT_CONCURRENCY;
use crate::infrastructure::llm::{DEFAULT_LLM_MODEL, DEFAULT_LLM_URL};

pub const RPC_URL_ENV: &str = "STARKNET_RPC_URL";
pub const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";
const CONFIG_ENV: &str = "TRACELENS_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub llm_url: String,
    pub llm_model: String,
    /// Directories scanned for `<address-or-class-hash>.json` ABI overrides
    pub abi_paths: Vec<String>,
    pub resolve_concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            llm_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            abi_paths: Vec::new(),
            resolve_concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// RPC endpoint: explicit value, then `$STARKNET_RPC_URL`, then the file
    pub fn rpc_url(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| std::env::var(RPC_URL_ENV).ok().filter(|url| !url.trim().is_empty()))
            .or_else(|| self.rpc_url.clone())
    }

    pub fn llm_api_key(&self) -> Option<String> {
        std::env::var(LLM_API_KEY_ENV).ok().filter(|key| !key.trim().is_empty())
    }

    pub fn abi_roots(&self) -> Vec<PathBuf> {
        self.abi_paths.iter().filter_map(|raw| expand_path(raw)).collect()
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(target: "tracelens::config", path = %path.display(), %err, "ignoring invalid config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("tracelens").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("tracelens").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "tracelens", "tracelens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("tracelens"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("tracelens"));
    }
    directories::ProjectDirs::from("io", "tracelens", "tracelens")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn labels_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("labels.sqlite3"))
}

pub fn abi_cache_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("abi_cache.sqlite3"))
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            rpc_url = "http://localhost:5050"
            abi_paths = ["./abis", "  "]
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:5050"));
        assert_eq!(config.llm_model, DEFAULT_LLM_MODEL);
        assert_eq!(config.resolve_concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.abi_roots(), vec![PathBuf::from("./abis")]);
    }

    #[test]
    fn test_explicit_rpc_url_wins() {
        let config = Config {
            rpc_url: Some("http://file".into()),
            ..Config::default()
        };
        assert_eq!(config.rpc_url(Some("http://flag")).as_deref(), Some("http://flag"));
    }
}
