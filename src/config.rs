use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub kitsu: KitsuConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
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
            database_path: "sqlite:data/kitsudex.db".to_string(),
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
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KitsuConfig {
    pub base_url: String,

    pub connect_timeout_seconds: u64,

    pub read_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for KitsuConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kitsu.io/api/edge".to_string(),
            connect_timeout_seconds: 5,
            read_timeout_seconds: 5,
            user_agent: format!("kitsudex/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    /// Emit logs as JSON lines instead of the human readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
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
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("kitsudex").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".kitsudex").join("config.toml"));
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
        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("Session inactivity timeout must be > 0 minutes");
        }

        url::Url::parse(&self.kitsu.base_url)
            .with_context(|| format!("Invalid Kitsu base URL: {}", self.kitsu.base_url))?;

        for (name, value) in [
            ("connect", self.kitsu.connect_timeout_seconds),
            ("read", self.kitsu.read_timeout_seconds),
        ] {
            if !(1..=120).contains(&value) {
                anyhow::bail!("Kitsu {name} timeout must be between 1 and 120 seconds");
            }
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}
