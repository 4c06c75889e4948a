//! Per-process resource samples and the live stats derived from them

use serde::Serialize;
use std::time::{Duration, SystemTime};

use super::BotStatus;

/// Point-in-time resource reading for a native PID
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub start_time: SystemTime,
}

impl ProcessSample {
    pub fn uptime(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
    }
}

/// Result of `get_live_stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LiveStats {
    /// The process is alive and was sampled
    Sampled {
        pid: u32,
        cpu_percent: f64,
        memory_percent: f64,
        uptime: String,
    },
    /// The bot holds no process; nothing to sample
    Idle { status: BotStatus },
    /// Sampling found the process gone; the bot was reconciled to stopped
    Exited { pid: u32 },
}

impl LiveStats {
    pub fn sampled(pid: u32, sample: &ProcessSample) -> Self {
        LiveStats::Sampled {
            pid,
            cpu_percent: round1(sample.cpu_percent),
            memory_percent: round1(sample.memory_percent),
            uptime: format_uptime(sample.uptime()),
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Render a duration as `H:MM:SS`, prefixed with `N day(s), ` past 24h
pub fn format_uptime(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
