//! Application configuration
//!
//! Read from `~/.cotizador/config.json` when present, then overridden by
//! `COTIZADOR_*` environment variables. Every field has a default so an
//! empty or missing file is valid.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::insurers::InsurerId;
use crate::types::{CotizadorError, Result};

/// Directory under the home directory holding config, logs and the last quote
const DATA_DIR_NAME: &str = ".cotizador";

const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/cotizacion-api";

pub const DEFAULT_CATALOG_URL: &str =
    "https://api.catalogos.therocketcode.com/api/v1/catalogs/qualitas";

/// Environment overrides
pub const ENV_API_URL: &str = "COTIZADOR_API_URL";
pub const ENV_CATALOG_URL: &str = "COTIZADOR_CATALOG_URL";
pub const ENV_CATALOG_USER: &str = "COTIZADOR_CATALOG_USER";
pub const ENV_CATALOG_PASSWORD: &str = "COTIZADOR_CATALOG_PASSWORD";
pub const ENV_LOG: &str = "COTIZADOR_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the quoting backend (individual and batch APIs)
    pub api_url: String,
    pub catalog_url: String,
    pub catalog_user: Option<String>,
    pub catalog_password: Option<String>,
    /// Endpoint number overrides; `null` disables an insurer
    pub endpoints: HashMap<InsurerId, Option<u32>>,
    pub request_timeout_secs: u64,
    pub catalog_timeout_secs: u64,
    /// Interval between batch status polls
    pub poll_interval_secs: u64,
    /// Where spreadsheets are written; current directory when unset
    pub export_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_user: None,
            catalog_password: None,
            endpoints: HashMap::new(),
            request_timeout_secs: 30,
            catalog_timeout_secs: 10,
            poll_interval_secs: 10,
            export_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = data_dir()?.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            CotizadorError::Config(format!("invalid {}: {}", path.display(), e))
        })
    }

    /// Apply `COTIZADOR_*` overrides looked up through `var`
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(url) = non_empty(ENV_CATALOG_URL) {
            self.catalog_url = url;
        }
        if let Some(user) = non_empty(ENV_CATALOG_USER) {
            self.catalog_user = Some(user);
        }
        if let Some(password) = non_empty(ENV_CATALOG_PASSWORD) {
            self.catalog_password = Some(password);
        }
        if let Some(level) = non_empty(ENV_LOG) {
            self.log_level = level;
        }
    }

    /// Endpoint number for an insurer, None when disabled
    pub fn endpoint(&self, insurer: InsurerId) -> Option<u32> {
        match self.endpoints.get(&insurer) {
            Some(configured) => *configured,
            None => Some(insurer.default_endpoint()),
        }
    }

    /// Per-insurer quoting URLs in insurer order
    pub fn endpoint_table(&self) -> Vec<(InsurerId, Option<String>)> {
        InsurerId::all()
            .iter()
            .map(|&id| {
                let url = self
                    .endpoint(id)
                    .map(|n| format!("{}/api/cotizacion/{}", self.base_url(), n));
                (id, url)
            })
            .collect()
    }

    /// Batch API root
    pub fn batch_url(&self) -> String {
        format!("{}/api/cotizacion-masiva", self.base_url())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// `~/.cotizador`
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| CotizadorError::Config("Cannot determine home directory".into()))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"api_url": "http://quotes.local/", "endpoints": {"gnp": 2, "axa": null}}"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://quotes.local/");
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.endpoint(InsurerId::Gnp), Some(2));
        assert_eq!(config.endpoint(InsurerId::Axa), None);
        assert_eq!(config.endpoint(InsurerId::Hdi), Some(1));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(CotizadorError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some("http://api.test".into()),
            ENV_CATALOG_USER => Some("user".into()),
            ENV_CATALOG_PASSWORD => Some("".into()),
            _ => None,
        });
        assert_eq!(config.api_url, "http://api.test");
        assert_eq!(config.catalog_user.as_deref(), Some("user"));
        assert_eq!(config.catalog_password, None);
    }

    #[test]
    fn test_endpoint_table_urls() {
        let config = AppConfig {
            api_url: "http://localhost:8080/cotizacion-api/".into(),
            ..AppConfig::default()
        };
        let table = config.endpoint_table();
        assert_eq!(table.len(), 5);
        assert_eq!(
            table[0],
            (
                InsurerId::Hdi,
                Some("http://localhost:8080/cotizacion-api/api/cotizacion/1".to_string())
            )
        );
        assert_eq!(
            config.batch_url(),
            "http://localhost:8080/cotizacion-api/api/cotizacion-masiva"
        );
    }
}
