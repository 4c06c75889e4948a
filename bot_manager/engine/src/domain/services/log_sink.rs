//! Append-only log channel for bots
//! Persists each entry and fans it out; failures never reach the caller

use crate::domain::ports::{BotStore, Broadcaster};
use crate::domain::{BotEvent, BotId, LogEntry, LogLevel, LogSource};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct LogSink {
    store: Arc<dyn BotStore>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl LogSink {
    pub fn new(store: Arc<dyn BotStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    pub async fn record(
        &self,
        bot_id: &BotId,
        level: LogLevel,
        message: impl Into<String>,
        source: LogSource,
    ) -> LogEntry {
        let entry = LogEntry::new(bot_id.clone(), level, message, source);
        mirror(&entry);

        if let Err(e) = self.store.append_log(entry.clone()).await {
            warn!(bot_id = %bot_id, error = %e, "Failed to persist log entry");
        }
        self.broadcaster.publish(BotEvent::Log(entry.clone()));
        entry
    }
}

fn mirror(entry: &LogEntry) {
    // Captured bot output is chatty; keep it out of the daemon log unless asked for
    if entry.source == LogSource::Bot {
        debug!(bot_id = %entry.bot_id, level = %entry.level, "{}", entry.message);
        return;
    }

    match entry.level {
        LogLevel::Debug => debug!(bot_id = %entry.bot_id, source = %entry.source, "{}", entry.message),
        LogLevel::Info => info!(bot_id = %entry.bot_id, source = %entry.source, "{}", entry.message),
        LogLevel::Warning => warn!(bot_id = %entry.bot_id, source = %entry.source, "{}", entry.message),
        LogLevel::Error => error!(bot_id = %entry.bot_id, source = %entry.source, "{}", entry.message),
    }
}
