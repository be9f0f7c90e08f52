//! Session configuration.
//!
//! Every field is optional in TOML; missing values fall back to the client's
//! built-in identity and pool size.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Euterpe-GTK HTTP Client";
/// Maximum number of concurrent connections held by the session.
pub const DEFAULT_MAX_CONNECTIONS: usize = 6;
/// Worker threads backing the session's I/O runtime.
pub const DEFAULT_WORKER_THREADS: usize = 2;

/// HTTP session settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Upper bound on in-flight requests (and idle connections per host).
    pub max_connections: usize,
    /// Threads in the session's dedicated runtime.
    pub worker_threads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl SessionConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("parse config {:?}", path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(raw: &str) -> Result<Self> {
        let cfg = toml::from_str::<SessionConfig>(raw)?;
        if cfg.max_connections == 0 {
            anyhow::bail!("max_connections must be at least 1");
        }
        if cfg.worker_threads == 0 {
            anyhow::bail!("worker_threads must be at least 1");
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.user_agent, "Euterpe-GTK HTTP Client");
        assert_eq!(cfg.max_connections, 6);
        assert_eq!(cfg.worker_threads, 2);
    }

    #[test]
    fn parse_fills_missing_fields_with_defaults() {
        let cfg = SessionConfig::parse("user_agent = \"euterpe-test\"\n").unwrap();
        assert_eq!(cfg.user_agent, "euterpe-test");
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn parse_rejects_zero_connections() {
        assert!(SessionConfig::parse("max_connections = 0\n").is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "euterpe-http-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "max_connections = 3\nworker_threads = 1\n").unwrap();
        let cfg = SessionConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.max_connections, 3);
        assert_eq!(cfg.worker_threads, 1);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }
}
