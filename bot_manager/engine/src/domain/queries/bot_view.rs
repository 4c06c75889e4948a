//! Read model for bots, enriched with live process stats

use serde::Serialize;

use crate::domain::{Bot, LiveStats};

#[derive(Debug, Clone, Serialize)]
pub struct BotView {
    #[serde(flatten)]
    pub bot: Bot,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub uptime: Option<String>,
}

impl BotView {
    pub fn new(bot: Bot, stats: &LiveStats) -> Self {
        match stats {
            LiveStats::Sampled {
                cpu_percent,
                memory_percent,
                uptime,
                ..
            } => Self {
                bot,
                cpu_usage: Some(*cpu_percent),
                memory_usage: Some(*memory_percent),
                uptime: Some(uptime.clone()),
            },
            LiveStats::Idle { .. } | LiveStats::Exited { .. } => Self::idle(bot),
        }
    }

    pub fn idle(bot: Bot) -> Self {
        Self {
            bot,
            cpu_usage: None,
            memory_usage: None,
            uptime: None,
        }
    }
}
