use crate::constants::bot::DEFAULT_LOG_LIMIT;
use crate::domain::{BotId, LogLevel};

/// Log lookup for one bot, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    pub bot_id: BotId,
    pub limit: usize,
    pub level: Option<LogLevel>,
}

impl LogQuery {
    pub fn new(bot_id: BotId) -> Self {
        Self {
            bot_id,
            limit: DEFAULT_LOG_LIMIT,
            level: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }
}
