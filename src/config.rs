use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub tmdb: TmdbConfig,

    pub streaming: StreamingConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub min_password_length: usize,

    /// Avatar assigned to accounts that register without one
    pub default_avatar: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 8,
            default_avatar: "https://api.dicebear.com/9.x/adventurer/svg?seed=Emery".to_string(),
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

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// `"*"` allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// `pretty` or `json`
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/reelhub.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// Falls back to the `TMDB_API_KEY` environment variable when empty
    pub api_key: String,

    pub base_url: String,

    pub image_base_url: String,

    pub language: String,

    pub request_timeout_seconds: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            language: "fr-FR".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Embed hosts for primary stream URLs; the first entry is used
    pub domains: Vec<String>,

    pub vidsrc_base_url: String,

    pub embedsu_base_url: String,

    pub superembed_base_url: String,

    pub probe_timeout_seconds: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            domains: vec![
                "vidsrc.xyz".to_string(),
                "vidsrc.cc".to_string(),
                "multiembed.mov".to_string(),
            ],
            vidsrc_base_url: "https://vidsrc.to/embed".to_string(),
            embedsu_base_url: "https://embed.su/embed".to_string(),
            superembed_base_url: "https://multiembed.mov/directstream.php".to_string(),
            probe_timeout_seconds: 5,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

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
        config.apply_env_overrides();

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.tmdb.api_key.is_empty()
            && let Ok(key) = std::env::var("TMDB_API_KEY")
        {
            self.tmdb.api_key = key;
        }

        if let Ok(url) = std::env::var("REELHUB_DATABASE_URL") {
            self.general.database_path = url;
        }

        if let Ok(port) = std::env::var("REELHUB_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
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
            paths.push(config_dir.join("reelhub").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".reelhub").join("config.toml"));
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
        if self.streaming.domains.is_empty() {
            anyhow::bail!("At least one streaming domain must be configured");
        }

        if self.tmdb.request_timeout_seconds == 0 || self.streaming.probe_timeout_seconds == 0 {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        if self.security.min_password_length == 0 {
            anyhow::bail!("min_password_length must be at least 1");
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
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.tmdb.language, "fr-FR");
        assert_eq!(config.tmdb.request_timeout_seconds, 10);
        assert_eq!(config.streaming.domains[0], "vidsrc.xyz");
        assert_eq!(config.security.min_password_length, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[tmdb]"));
        assert!(toml_str.contains("[streaming]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [tmdb]
            language = "en-US"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.tmdb.language, "en-US");

        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_validate_rejects_empty_domains() {
        let mut config = Config::default();
        config.streaming.domains.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pool_bounds() {
        let mut config = Config::default();
        config.general.min_db_connections = 10;
        config.general.max_db_connections = 2;
        assert!(config.validate().is_err());
    }
}
