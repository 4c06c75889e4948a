//! Application-wide constants and default values
//!
//! Centralizes magic numbers and default configurations for better maintainability

/// Supervisor lifecycle defaults
pub mod supervisor {
    /// Grace period between SIGTERM and SIGKILL (seconds)
    pub const DEFAULT_STOP_GRACE_SEC: u64 = 5;

    /// Bound on the wait for exit after SIGKILL (seconds)
    pub const DEFAULT_KILL_TIMEOUT_SEC: u64 = 5;

    /// Pause between the stop and start halves of a restart (milliseconds)
    pub const DEFAULT_RESTART_DELAY_MS: u64 = 1000;

    /// Capacity of the per-bot output line channel
    pub const OUTPUT_CHANNEL_CAPACITY: usize = 256;
}

/// Periodic task defaults
pub mod loops {
    /// Interval between reconciliation passes (seconds)
    pub const DEFAULT_RECONCILE_INTERVAL_SEC: u64 = 2;

    /// Interval between system_update broadcasts (seconds)
    pub const DEFAULT_BROADCAST_INTERVAL_SEC: u64 = 5;
}

/// Broadcast fan-out defaults
pub mod broadcast {
    /// Queue length for each listener before it is considered stalled
    pub const DEFAULT_LISTENER_CAPACITY: usize = 1024;
}

/// Bot record defaults
pub mod bot {
    /// Working directory used when a bot does not declare one
    pub const DEFAULT_WORKING_DIR: &str = "/app";

    /// Default number of log entries returned by a log query
    pub const DEFAULT_LOG_LIMIT: usize = 100;

    /// Locations searched for bot definitions when none is configured
    pub const DEFAULT_CONFIG_PATHS: &[&str] = &["/etc/bot-manager/bots.yaml", "/etc/bot-manager/bots.d"];
}
