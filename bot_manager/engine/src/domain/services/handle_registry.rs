//! Registry of live supervision handles
//! Only the supervisor writes here, always under the bot's lock

use crate::domain::{BotId, DomainError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::time::timeout;

/// A spawned process owned by the supervisor
#[derive(Debug)]
pub struct SupervisionHandle {
    bot_id: BotId,
    pid: u32,
    started_at: SystemTime,
    exit: watch::Receiver<Option<i32>>,
}

impl SupervisionHandle {
    pub fn new(bot_id: BotId, pid: u32, exit: watch::Receiver<Option<i32>>) -> Self {
        Self {
            bot_id,
            pid,
            started_at: SystemTime::now(),
            exit,
        }
    }

    pub fn bot_id(&self) -> &BotId {
        &self.bot_id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Exit code, once the child has been reaped
    pub fn exit_code(&self) -> Option<i32> {
        *self.exit.borrow()
    }

    pub fn has_exited(&self) -> bool {
        self.exit_code().is_some()
    }

    /// Wait up to `limit` for the child to be reaped
    pub async fn wait_exit(&self, limit: Duration) -> Option<i32> {
        let mut rx = self.exit.clone();
        let waited = timeout(limit, rx.wait_for(|code| code.is_some()))
            .await
            .map(|res| res.map(|code| *code));

        match waited {
            Ok(Ok(code)) => code,
            // Reaper gone; whatever it last published is final
            Ok(Err(_)) => *rx.borrow(),
            Err(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: RwLock<HashMap<BotId, Arc<SupervisionHandle>>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handle; at most one per bot
    pub fn put(&self, handle: Arc<SupervisionHandle>) -> Result<(), DomainError> {
        let mut handles = self.handles.write().unwrap_or_else(PoisonError::into_inner);
        if handles.contains_key(handle.bot_id()) {
            return Err(DomainError::DuplicateHandle(handle.bot_id().to_string()));
        }
        handles.insert(handle.bot_id().clone(), handle);
        Ok(())
    }

    pub fn get(&self, bot_id: &BotId) -> Option<Arc<SupervisionHandle>> {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(bot_id)
            .cloned()
    }

    pub fn remove(&self, bot_id: &BotId) -> Option<Arc<SupervisionHandle>> {
        self.handles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(bot_id)
    }

    pub fn contains(&self, bot_id: &BotId) -> bool {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(bot_id)
    }

    pub fn bot_ids(&self) -> Vec<BotId> {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
