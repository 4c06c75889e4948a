//! Store port for bot records and their logs
//! This is an interface - implementations are in infrastructure layer

use crate::domain::{Bot, BotId, BotStatus, DomainError, LogEntry, LogQuery};
use async_trait::async_trait;
use std::time::SystemTime;

/// State fields written after every lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotStatusUpdate {
    pub status: BotStatus,
    pub pid: Option<u32>,
    pub last_started: Option<SystemTime>,
    pub last_stopped: Option<SystemTime>,
}

#[async_trait]
pub trait BotStore: Send + Sync {
    /// Insert a new record; fails if the id is taken
    async fn insert_bot(&self, bot: Bot) -> Result<(), DomainError>;

    async fn load_bot(&self, id: &BotId) -> Result<Option<Bot>, DomainError>;

    async fn list_bots(&self) -> Result<Vec<Bot>, DomainError>;

    /// Persist lifecycle state only
    async fn save_bot_status(&self, id: &BotId, update: BotStatusUpdate)
        -> Result<(), DomainError>;

    /// Persist definition fields only; the stored lifecycle state is kept
    async fn update_definition(&self, bot: &Bot) -> Result<(), DomainError>;

    async fn delete_bot(&self, id: &BotId) -> Result<(), DomainError>;

    async fn append_log(&self, entry: LogEntry) -> Result<(), DomainError>;

    /// Entries matching the query, newest first
    async fn query_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>, DomainError>;

    async fn delete_logs(&self, id: &BotId) -> Result<(), DomainError>;

    async fn count_bots(&self) -> Result<usize, DomainError> {
        Ok(self.list_bots().await?.len())
    }

    /// Load a bot or fail with BotNotFound
    async fn find_bot(&self, id: &BotId) -> Result<Bot, DomainError> {
        self.load_bot(id)
            .await?
            .ok_or_else(|| DomainError::BotNotFound(id.to_string()))
    }
}
