use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::clients::usgs::UsgsConfig;
use crate::constants::landsat;

pub const ENV_USERNAME: &str = "LANDSAT_USERNAME";
pub const ENV_PASSWORD: &str = "LANDSAT_PASSWORD";
pub const ENV_DATABASE_URL: &str = "LANDSAT_DATABASE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub imagery: ImageryConfig,

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
            database_path: "sqlite:data/landsat.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
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
            port: 5000,
            cors_allowed_origins: vec![
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    /// USGS M2M JSON API base URL
    pub m2m_url: String,

    /// Raster-window service base URL
    pub window_url: String,

    pub username: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,

    pub dataset: String,

    /// Upper bound for scene cloud cover in percent (default: 50)
    pub max_cloud_cover: f64,

    /// Days back from today searched when no date range is given (default: 30)
    pub search_window_days: u32,

    /// Request timeout in seconds (default: 60)
    pub request_timeout_seconds: u64,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            m2m_url: landsat::M2M_URL.to_string(),
            window_url: "http://localhost:8090".to_string(),
            username: String::new(),
            password: String::new(),
            dataset: landsat::DATASET.to_string(),
            max_cloud_cover: landsat::MAX_CLOUD_COVER,
            search_window_days: landsat::SEARCH_WINDOW_DAYS,
            request_timeout_seconds: 60,
        }
    }
}

impl ImageryConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub fn usgs(&self) -> UsgsConfig {
        UsgsConfig {
            m2m_url: self.m2m_url.clone(),
            window_url: self.window_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            dataset: self.dataset.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Credentials and the database URL can come from the environment (or a
    /// `.env` file) so they stay out of `config.toml`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(username) = lookup(ENV_USERNAME) {
            self.imagery.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.imagery.password = password;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.general.database_path = url;
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_config_path();
        self.save_to_path(&path)
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
            paths.push(config_dir.join("landsat-explorer").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".landsat-explorer").join("config.toml"));
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
        if self.imagery.m2m_url.trim().is_empty() {
            anyhow::bail!("Imagery M2M URL cannot be empty");
        }

        if self.imagery.window_url.trim().is_empty() {
            anyhow::bail!("Imagery window URL cannot be empty");
        }

        if !(0.0..=100.0).contains(&self.imagery.max_cloud_cover) {
            anyhow::bail!(
                "max_cloud_cover must be between 0 and 100, got {}",
                self.imagery.max_cloud_cover
            );
        }

        if self.imagery.search_window_days == 0 {
            anyhow::bail!("search_window_days must be > 0");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
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
        assert_eq!(config.general.database_path, "sqlite:data/landsat.db");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.imagery.dataset, "landsat_ot_c2_l2");
        assert!((config.imagery.max_cloud_cover - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.imagery.search_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[imagery]"));
        assert!(toml_str.contains("[observability]"));
        assert!(!toml_str.contains("password"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [imagery]
            max_cloud_cover = 20.0
            username = "scientist"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!((config.imagery.max_cloud_cover - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.imagery.username, "scientist");

        assert_eq!(config.imagery.search_window_days, 30);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validation_rejects_bad_imagery_settings() {
        let mut config = Config::default();
        config.imagery.max_cloud_cover = 120.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.imagery.search_window_days = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.imagery.window_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_USERNAME => Some("m2m-user".to_string()),
            ENV_PASSWORD => Some("secret-token".to_string()),
            ENV_DATABASE_URL => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.imagery.username, "m2m-user");
        assert_eq!(config.imagery.password, "secret-token");
        assert_eq!(config.general.database_path, "sqlite:data/landsat.db");
    }
}
