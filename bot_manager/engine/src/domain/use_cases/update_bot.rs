//! UpdateBot use case
//! Partial edits of a bot definition; changes apply at the next start

use crate::domain::ports::BotStore;
use crate::domain::services::LogSink;
use crate::domain::{Bot, DomainError, LogLevel, LogSource, UpdateBotCommand};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait UpdateBot: Send + Sync {
    async fn execute(&self, command: UpdateBotCommand) -> Result<Bot, DomainError>;
}

pub struct UpdateBotUseCase {
    store: Arc<dyn BotStore>,
    log_sink: LogSink,
}

impl UpdateBotUseCase {
    pub fn new(store: Arc<dyn BotStore>, log_sink: LogSink) -> Self {
        Self { store, log_sink }
    }
}

#[async_trait]
impl UpdateBot for UpdateBotUseCase {
    async fn execute(&self, command: UpdateBotCommand) -> Result<Bot, DomainError> {
        let mut bot = self.store.find_bot(&command.bot_id).await?;
        if command.is_empty() {
            return Ok(bot);
        }

        bot.apply_update(&command)?;
        self.store.update_definition(&bot).await?;

        info!(bot_id = %bot.id(), name = %bot.name(), "Bot updated");
        self.log_sink
            .record(
                bot.id(),
                LogLevel::Info,
                format!("Bot '{}' updated", bot.name()),
                LogSource::Api,
            )
            .await;

        // Lifecycle fields may have moved on while we edited
        self.store.find_bot(&command.bot_id).await
    }
}
