use crate::domain::{BotId, LogLevel, LogSource};

/// Explicit log append for a bot
#[derive(Debug, Clone)]
pub struct AppendLogCommand {
    pub bot_id: BotId,
    pub level: LogLevel,
    pub message: String,
    pub source: LogSource,
}

impl AppendLogCommand {
    pub fn new(bot_id: BotId, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            bot_id,
            level,
            message: message.into(),
            source: LogSource::Bot,
        }
    }
}
