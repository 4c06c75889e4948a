use crate::domain::BotId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-bot async locks serializing lifecycle transitions
///
/// Different bots never contend; the outer map lock is only held while
/// looking up the entry.
#[derive(Debug, Default)]
pub struct BotLocks {
    locks: Mutex<HashMap<BotId, Arc<AsyncMutex<()>>>>,
}

impl BotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, bot_id: &BotId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(bot_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted bot
    pub fn forget(&self, bot_id: &BotId) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(bot_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_bot_is_serialized() {
        let locks = Arc::new(BotLocks::new());
        let id = BotId::from("b1");

        let guard = locks.acquire(&id).await;

        let locks2 = locks.clone();
        let id2 = id.clone();
        let waiter = tokio::spawn(async move {
            let _guard = locks2.acquire(&id2).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_bots_do_not_contend() {
        let locks = BotLocks::new();
        let _a = locks.acquire(&BotId::from("a")).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&BotId::from("b")))
            .await;
        assert!(b.is_ok());
    }
}
