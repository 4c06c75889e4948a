//! DeleteBot use case

use crate::domain::services::BotSupervisor;
use crate::domain::{BotId, DomainError};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait DeleteBot: Send + Sync {
    async fn execute(&self, bot_id: &BotId) -> Result<(), DomainError>;
}

/// Stops a running bot before removing its record and logs
pub struct DeleteBotUseCase {
    supervisor: Arc<BotSupervisor>,
}

impl DeleteBotUseCase {
    pub fn new(supervisor: Arc<BotSupervisor>) -> Self {
        Self { supervisor }
    }
}

#[async_trait]
impl DeleteBot for DeleteBotUseCase {
    async fn execute(&self, bot_id: &BotId) -> Result<(), DomainError> {
        self.supervisor.delete(bot_id).await
    }
}
