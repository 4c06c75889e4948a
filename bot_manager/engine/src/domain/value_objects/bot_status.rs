//! BotStatus value object
//! Declared lifecycle status of a bot record

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    /// Not running; the initial status of every bot
    #[default]
    Stopped,

    /// Spawn in progress
    Starting,

    /// Process is alive and supervised
    Running,

    /// Termination in progress
    Stopping,

    /// The OS rejected a spawn or a termination
    Error,
}

impl BotStatus {
    /// Statuses in which the bot owns a live process handle
    pub fn holds_process(&self) -> bool {
        matches!(self, BotStatus::Running | BotStatus::Stopping)
    }

    /// A start request is rejected with AlreadyRunning in these statuses
    pub fn is_active(&self) -> bool {
        matches!(self, BotStatus::Running | BotStatus::Starting)
    }

    /// Validate state transition
    pub fn can_transition_to(&self, next: BotStatus) -> bool {
        use BotStatus::*;

        matches!(
            (self, next),
            (Stopped, Starting)
                | (Error, Starting)
                | (Starting, Running)
                | (Starting, Error)
                | (Running, Stopping)
                // exit detected by reconciliation
                | (Running, Stopped)
                | (Stopping, Stopped)
                | (Stopping, Error)
        )
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotStatus::Stopped => write!(f, "stopped"),
            BotStatus::Starting => write!(f, "starting"),
            BotStatus::Running => write!(f, "running"),
            BotStatus::Stopping => write!(f, "stopping"),
            BotStatus::Error => write!(f, "error"),
        }
    }
}
