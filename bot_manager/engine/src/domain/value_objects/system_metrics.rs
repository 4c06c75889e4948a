use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::rfc3339;

/// Host-wide utilization as read by a `SystemSampler`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Host metrics plus bot counts, as published in `system_update` events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    #[serde(with = "rfc3339")]
    pub timestamp: SystemTime,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub active_bots: usize,
    pub total_bots: usize,
}

impl SystemMetrics {
    pub fn new(usage: HostUsage, active_bots: usize, total_bots: usize) -> Self {
        Self {
            timestamp: SystemTime::now(),
            cpu_usage: usage.cpu_percent,
            memory_usage: usage.memory_percent,
            disk_usage: usage.disk_percent,
            active_bots,
            total_bots,
        }
    }
}
