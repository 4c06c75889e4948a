//! Events fanned out to listeners
//! Serialized as `{"type": ..., "data": ...}` frames

use serde::Serialize;
use std::time::SystemTime;

use super::{rfc3339, BotId, BotStatus, LogEntry, SystemMetrics};
use crate::domain::queries::BotView;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum BotEvent {
    StatusChanged(StatusChange),
    Log(LogEntry),
    SystemUpdate(SystemUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub bot_id: BotId,
    pub from: BotStatus,
    pub to: BotStatus,
    pub pid: Option<u32>,
    #[serde(with = "rfc3339")]
    pub timestamp: SystemTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemUpdate {
    pub metrics: SystemMetrics,
    pub running_bots: Vec<BotView>,
}

impl BotEvent {
    pub fn status_changed(
        bot_id: BotId,
        from: BotStatus,
        to: BotStatus,
        pid: Option<u32>,
    ) -> Self {
        BotEvent::StatusChanged(StatusChange {
            bot_id,
            from,
            to,
            pid,
            timestamp: SystemTime::now(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BotEvent::StatusChanged(_) => "status_changed",
            BotEvent::Log(_) => "log",
            BotEvent::SystemUpdate(_) => "system_update",
        }
    }

    /// Bot the event is about, if any
    pub fn bot_id(&self) -> Option<&BotId> {
        match self {
            BotEvent::StatusChanged(change) => Some(&change.bot_id),
            BotEvent::Log(entry) => Some(&entry.bot_id),
            BotEvent::SystemUpdate(_) => None,
        }
    }
}
