use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL (overridden by `DATABASE_URL`)
    pub postgres_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Session lifetime and sweeper cadence
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub poll_interval_ms: u64,
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 120,
            poll_interval_ms: 100,
            sweep_interval_secs: 120,
        }
    }
}

/// Transfer engine settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    /// Deadline for a whole transfer transaction; 0 disables it
    pub timeout_ms: u64,
}

impl TransferConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

fn default_max_connections() -> u32 {
    20
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.postgres_url = url;
        }

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.session.ttl_secs > 0, "session.ttl_secs must be positive");
        ensure!(
            self.session.poll_interval_ms > 0,
            "session.poll_interval_ms must be positive"
        );
        ensure!(
            self.session.poll_interval_ms < self.session.ttl_secs.saturating_mul(1000),
            "session.poll_interval_ms must be shorter than the ttl"
        );
        ensure!(
            self.session.sweep_interval_secs > 0,
            "session.sweep_interval_secs must be positive"
        );
        ensure!(self.max_connections > 0, "max_connections must be positive");
        Ok(())
    }
}
