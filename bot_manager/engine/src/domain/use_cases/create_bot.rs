//! CreateBot use case
//! Validates and registers a new bot record

use crate::domain::ports::BotStore;
use crate::domain::services::LogSink;
use crate::domain::{
    Bot, CreateBotCommand, CreateBotResponse, DomainError, LogLevel, LogSource,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait CreateBot: Send + Sync {
    async fn execute(&self, command: CreateBotCommand) -> Result<CreateBotResponse, DomainError>;
}

pub struct CreateBotUseCase {
    store: Arc<dyn BotStore>,
    log_sink: LogSink,
}

impl CreateBotUseCase {
    pub fn new(store: Arc<dyn BotStore>, log_sink: LogSink) -> Self {
        Self { store, log_sink }
    }
}

#[async_trait]
impl CreateBot for CreateBotUseCase {
    async fn execute(&self, command: CreateBotCommand) -> Result<CreateBotResponse, DomainError> {
        let (program, args) = command.program_and_args();

        let mut builder = Bot::builder(command.name.clone(), program)
            .args(args)
            .bot_type(command.bot_type)
            .env(command.env.clone())
            .capture_output(command.capture_output);
        if let Some(description) = command.description.clone() {
            builder = builder.description(description);
        }
        if let Some(port) = command.port {
            builder = builder.port(port);
        }
        if let Some(dir) = command.working_dir.clone() {
            builder = builder.working_dir(dir);
        }
        let bot = builder.build()?;

        let bot_id = bot.id().clone();
        let name = bot.name().to_string();
        self.store.insert_bot(bot).await?;

        info!(bot_id = %bot_id, name = %name, "Bot created");
        self.log_sink
            .record(
                &bot_id,
                LogLevel::Info,
                format!("Bot '{}' created", name),
                LogSource::Api,
            )
            .await;

        Ok(CreateBotResponse { bot_id, name })
    }
}
