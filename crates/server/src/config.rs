use crate::error::ServerError;
use intelli_summarize::{AppConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum upload body size in MB
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default = "default_true")]
    pub log_json: bool,

    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Directory holding uploaded files and feedback snapshots
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Login session lifetime in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Extra provider attempts per summary request
    #[serde(default = "default_summary_retries")]
    pub summary_retries: u32,

    /// Upper bound for a per-request `retries` override
    #[serde(default = "default_summary_max_retries")]
    pub summary_max_retries: u32,

    /// First backoff delay between provider attempts
    #[serde(default = "default_summary_retry_base_delay_ms")]
    pub summary_retry_base_delay_ms: u64,

    /// Remove unreferenced uploads when the server starts
    #[serde(default)]
    pub sweep_orphans_on_start: bool,

    /// Minimum age in seconds before an unreferenced upload counts as orphaned
    #[serde(default = "default_orphan_grace_secs")]
    pub orphan_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_upload_size_mb: default_max_upload_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_json: default_true(),
            database_url: default_database_url(),
            upload_dir: default_upload_dir(),
            session_ttl_secs: default_session_ttl_secs(),
            summary_retries: default_summary_retries(),
            summary_max_retries: default_summary_max_retries(),
            summary_retry_base_delay_ms: default_summary_retry_base_delay_ms(),
            sweep_orphans_on_start: false,
            orphan_grace_secs: default_orphan_grace_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `server.*` file, overridden by
    /// `INTELLI_SERVER__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("INTELLI_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.port == 0 {
            return Err(ServerError::Config("port must be non-zero".into()));
        }
        if self.max_upload_size_mb == 0 {
            return Err(ServerError::Config(
                "max_upload_size_mb must be at least 1".into(),
            ));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ServerError::Config("upload_dir must not be empty".into()));
        }
        if self.summary_retries > self.summary_max_retries {
            return Err(ServerError::Config(
                "summary_retries must not exceed summary_max_retries".into(),
            ));
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max upload size in bytes
    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Settings handed to the application services.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            session_ttl_secs: self.session_ttl_secs,
            orphan_grace_secs: self.orphan_grace_secs,
        }
    }

    /// Retry policy for the summarization engine.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(self.summary_retries)
            .with_base_delay(Duration::from_millis(self.summary_retry_base_delay_ms))
    }

    /// Cap a client-supplied retry count at `summary_max_retries`.
    pub fn clamp_retries(&self, requested: Option<u32>) -> Option<u32> {
        requested.map(|n| n.min(self.summary_max_retries))
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_upload_size_mb() -> usize {
    25
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_url() -> String {
    "sqlite://intelli_summarize.db".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_summary_retries() -> u32 {
    1
}

fn default_summary_max_retries() -> u32 {
    5
}

fn default_summary_retry_base_delay_ms() -> u64 {
    100
}

fn default_orphan_grace_secs() -> u64 {
    60 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_upload_size_mb, 25);
        assert_eq!(cfg.max_upload_size(), 25 * 1024 * 1024);
        assert_eq!(cfg.database_url, "sqlite://intelli_summarize.db");
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert!(cfg.enable_cors);
        assert!(!cfg.sweep_orphans_on_start);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let zero_port = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(zero_port.validate(), Err(ServerError::Config(_))));

        let no_uploads = ServerConfig {
            max_upload_size_mb: 0,
            ..ServerConfig::default()
        };
        assert!(no_uploads.validate().is_err());

        let no_dir = ServerConfig {
            upload_dir: PathBuf::new(),
            ..ServerConfig::default()
        };
        assert!(no_dir.validate().is_err());

        let default_over_cap = ServerConfig {
            summary_retries: 6,
            summary_max_retries: 5,
            ..ServerConfig::default()
        };
        assert!(default_over_cap.validate().is_err());
    }

    #[test]
    fn test_retry_override_is_capped() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.summary_max_retries, 5);
        assert_eq!(cfg.clamp_retries(None), None);
        assert_eq!(cfg.clamp_retries(Some(2)), Some(2));
        assert_eq!(cfg.clamp_retries(Some(u32::MAX)), Some(5));
    }

    #[test]
    fn test_service_settings_follow_config() {
        let cfg = ServerConfig {
            session_ttl_secs: 60,
            summary_retries: 3,
            summary_retry_base_delay_ms: 5,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.app_config().session_ttl_secs, 60);
        let retry = cfg.retry_config();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_delay_ms, 5);
    }
}
