//! Configuration
//!
//! Both the master and the secondary are configured entirely from the
//! environment (spec §6), each with typed fields and explicit defaults,
//! validated once at startup rather than scattered through the code that
//! uses them.

use std::time::Duration;

use crate::error::{Error, Result};

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Master node configuration.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Base URLs of all secondary nodes.
    pub secondaries: Vec<String>,
    /// Interval between health probes.
    pub heartbeat_interval: Duration,
    /// Per-probe timeout.
    pub heartbeat_timeout: Duration,
    /// Consecutive failures before HEALTHY -> SUSPECTED.
    pub suspected_threshold: u32,
    /// Consecutive failures before SUSPECTED -> UNHEALTHY.
    pub unhealthy_threshold: u32,
    /// Log level passed to the tracing subscriber.
    pub log_level: String,
}

impl MasterConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let secondaries = std::env::var("SECONDARIES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            host: env_string("HOST", "0.0.0.0"),
            port: env_parsed("PORT", 8000),
            secondaries,
            heartbeat_interval: Duration::from_secs_f64(env_parsed("HEARTBEAT_INTERVAL", 2.0)),
            heartbeat_timeout: Duration::from_secs_f64(env_parsed("HEARTBEAT_TIMEOUT", 5.0)),
            suspected_threshold: env_parsed("SUSPECTED_THRESHOLD", 2),
            unhealthy_threshold: env_parsed("UNHEALTHY_THRESHOLD", 5),
            log_level: env_string("LOG_LEVEL", "info"),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.unhealthy_threshold < self.suspected_threshold {
            return Err(Error::Config(
                "UNHEALTHY_THRESHOLD must be >= SUSPECTED_THRESHOLD".into(),
            ));
        }
        Ok(())
    }

    /// Total node count: the master plus every configured secondary.
    pub fn total_nodes(&self) -> usize {
        1 + self.secondaries.len()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Secondary node configuration.
#[derive(Debug, Clone)]
pub struct SecondaryConfig {
    /// Bind port. May be overridden by a CLI positional argument.
    pub port: u16,
    /// Artificial delay applied before the apply engine's critical section,
    /// for testing concurrent-arrival behavior.
    pub delay_ms: u64,
    /// Log level passed to the tracing subscriber.
    pub log_level: String,
}

impl SecondaryConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            port: env_parsed("PORT", 8001),
            delay_ms: env_parsed("DELAY_MS", 0),
            log_level: env_string("LOG_LEVEL", "info"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_config_defaults_when_env_absent() {
        std::env::remove_var("SECONDARIES");
        std::env::remove_var("PORT");
        let config = MasterConfig::from_env().unwrap();
        assert_eq!(config.port, 8000);
        assert!(config.secondaries.is_empty());
        assert_eq!(config.total_nodes(), 1);
    }

    #[test]
    fn master_config_parses_secondaries_list() {
        std::env::set_var("SECONDARIES", "http://a:8001, http://b:8001");
        let config = MasterConfig::from_env().unwrap();
        std::env::remove_var("SECONDARIES");
        assert_eq!(
            config.secondaries,
            vec!["http://a:8001".to_string(), "http://b:8001".to_string()]
        );
        assert_eq!(config.total_nodes(), 3);
    }

    #[test]
    fn secondary_config_defaults() {
        std::env::remove_var("PORT");
        std::env::remove_var("DELAY_MS");
        let config = SecondaryConfig::from_env();
        assert_eq!(config.port, 8001);
        assert_eq!(config.delay_ms, 0);
    }
}
