//! In-Memory Bot Store
//! Thread-safe implementation of the BotStore port

use crate::domain::ports::{BotStatusUpdate, BotStore};
use crate::domain::{Bot, BotId, DomainError, LogEntry, LogQuery};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Thread-safe in-memory document store for bots and their logs
#[derive(Clone, Default)]
pub struct InMemoryBotStore {
    bots: Arc<RwLock<HashMap<BotId, Bot>>>,
    logs: Arc<RwLock<Vec<LogEntry>>>,
}

impl InMemoryBotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BotStore for InMemoryBotStore {
    async fn insert_bot(&self, bot: Bot) -> Result<(), DomainError> {
        let mut bots = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        if bots.contains_key(bot.id()) {
            return Err(DomainError::Storage(format!(
                "bot '{}' already exists",
                bot.id()
            )));
        }

        info!(
            bot_id = %bot.id(),
            name = %bot.name(),
            total_bots = bots.len() + 1,
            "Bot stored"
        );
        bots.insert(bot.id().clone(), bot);
        Ok(())
    }

    async fn load_bot(&self, id: &BotId) -> Result<Option<Bot>, DomainError> {
        let bots = self.bots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(bots.get(id).cloned())
    }

    async fn list_bots(&self) -> Result<Vec<Bot>, DomainError> {
        let bots = self.bots.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Bot> = bots.values().cloned().collect();
        all.sort_by_key(|b| b.created_at());
        Ok(all)
    }

    async fn save_bot_status(
        &self,
        id: &BotId,
        update: BotStatusUpdate,
    ) -> Result<(), DomainError> {
        let mut bots = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        let bot = bots
            .get_mut(id)
            .ok_or_else(|| DomainError::BotNotFound(id.to_string()))?;

        debug!(bot_id = %id, status = %update.status, pid = ?update.pid, "Saving bot status");
        bot.apply_status_update(&update);
        Ok(())
    }

    async fn update_definition(&self, bot: &Bot) -> Result<(), DomainError> {
        let mut bots = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        let stored = bots
            .get_mut(bot.id())
            .ok_or_else(|| DomainError::BotNotFound(bot.id().to_string()))?;

        let state = stored.status_update();
        *stored = bot.clone();
        stored.apply_status_update(&state);
        Ok(())
    }

    async fn delete_bot(&self, id: &BotId) -> Result<(), DomainError> {
        let mut bots = self.bots.write().unwrap_or_else(PoisonError::into_inner);
        if bots.remove(id).is_none() {
            return Err(DomainError::BotNotFound(id.to_string()));
        }
        info!(bot_id = %id, total_bots = bots.len(), "Bot removed from store");
        Ok(())
    }

    async fn append_log(&self, entry: LogEntry) -> Result<(), DomainError> {
        self.logs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }

    async fn query_logs(&self, query: &LogQuery) -> Result<Vec<LogEntry>, DomainError> {
        let logs = self.logs.read().unwrap_or_else(PoisonError::into_inner);

        // Appends are chronological; walk backwards for newest first
        Ok(logs
            .iter()
            .rev()
            .filter(|e| e.bot_id == query.bot_id)
            .filter(|e| query.level.map_or(true, |level| e.level == level))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn delete_logs(&self, id: &BotId) -> Result<(), DomainError> {
        let mut logs = self.logs.write().unwrap_or_else(PoisonError::into_inner);
        let before = logs.len();
        logs.retain(|e| &e.bot_id != id);
        debug!(bot_id = %id, removed = before - logs.len(), "Deleted bot logs");
        Ok(())
    }

    async fn count_bots(&self) -> Result<usize, DomainError> {
        Ok(self.bots.read().unwrap_or_else(PoisonError::into_inner).len())
    }
}
