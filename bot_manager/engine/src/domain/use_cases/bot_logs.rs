//! BotLogs use case
//! Query and append log entries of a bot

use crate::domain::ports::BotStore;
use crate::domain::services::LogSink;
use crate::domain::{AppendLogCommand, DomainError, LogEntry, LogQuery};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BotLogs: Send + Sync {
    /// Entries newest first
    async fn query(&self, query: LogQuery) -> Result<Vec<LogEntry>, DomainError>;

    /// Persist and broadcast one entry
    async fn append(&self, command: AppendLogCommand) -> Result<LogEntry, DomainError>;
}

pub struct BotLogsUseCase {
    store: Arc<dyn BotStore>,
    log_sink: LogSink,
}

impl BotLogsUseCase {
    pub fn new(store: Arc<dyn BotStore>, log_sink: LogSink) -> Self {
        Self { store, log_sink }
    }
}

#[async_trait]
impl BotLogs for BotLogsUseCase {
    async fn query(&self, query: LogQuery) -> Result<Vec<LogEntry>, DomainError> {
        self.store.find_bot(&query.bot_id).await?;
        self.store.query_logs(&query).await
    }

    async fn append(&self, command: AppendLogCommand) -> Result<LogEntry, DomainError> {
        self.store.find_bot(&command.bot_id).await?;
        Ok(self
            .log_sink
            .record(&command.bot_id, command.level, command.message, command.source)
            .await)
    }
}
