//! Daemon configuration from environment variables
//!
//! Everything has a default, so the daemon runs with no environment at all.

use bm_engine::constants::{loops, supervisor};
use bm_engine::domain::services::SupervisorSettings;
use std::env;
use std::time::Duration;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Bot definitions file or directory; falls back to the default locations
    pub config_file: Option<String>,

    /// Start bots flagged `auto_start` after loading
    pub auto_start: bool,

    pub reconcile_interval: Duration,
    pub broadcast_interval: Duration,
    pub stop_grace: Duration,
    pub kill_timeout: Duration,
    pub restart_delay: Duration,

    /// Log filter directive
    pub log_level: String,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self {
            config_file: env::var("BM_CONFIG_FILE").ok().filter(|s| !s.is_empty()),
            auto_start: Self::parse_bool("BM_AUTO_START", true),
            reconcile_interval: Duration::from_secs(Self::parse_u64(
                "BM_RECONCILE_INTERVAL_SECS",
                loops::DEFAULT_RECONCILE_INTERVAL_SEC,
            )),
            broadcast_interval: Duration::from_secs(Self::parse_u64(
                "BM_BROADCAST_INTERVAL_SECS",
                loops::DEFAULT_BROADCAST_INTERVAL_SEC,
            )),
            stop_grace: Duration::from_secs(Self::parse_u64(
                "BM_STOP_GRACE_SECS",
                supervisor::DEFAULT_STOP_GRACE_SEC,
            )),
            kill_timeout: Duration::from_secs(Self::parse_u64(
                "BM_KILL_TIMEOUT_SECS",
                supervisor::DEFAULT_KILL_TIMEOUT_SEC,
            )),
            restart_delay: Duration::from_millis(Self::parse_u64(
                "BM_RESTART_DELAY_MS",
                supervisor::DEFAULT_RESTART_DELAY_MS,
            )),
            log_level: Self::parse_log_level(),
        }
    }

    fn parse_u64(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }

    fn parse_log_level() -> String {
        // Priority: BM_LOG_LEVEL > RUST_LOG > default
        env::var("BM_LOG_LEVEL")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            stop_grace: self.stop_grace,
            kill_timeout: self.kill_timeout,
            restart_delay: self.restart_delay,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.reconcile_interval.is_zero() {
            return Err("BM_RECONCILE_INTERVAL_SECS must be greater than zero".to_string());
        }
        if self.broadcast_interval.is_zero() {
            return Err("BM_BROADCAST_INTERVAL_SECS must be greater than zero".to_string());
        }
        Ok(())
    }
}
