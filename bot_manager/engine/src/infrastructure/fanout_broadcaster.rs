//! Fan-out broadcaster
//!
//! Every listener owns a bounded queue. `publish` clones one `Arc` per
//! listener and never waits: a listener whose queue is full or whose receiver
//! is gone is removed from the set.

use crate::constants::broadcast::DEFAULT_LISTENER_CAPACITY;
use crate::domain::ports::Broadcaster;
use crate::domain::BotEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

struct Listener {
    id: u64,
    name: String,
    sender: mpsc::Sender<Arc<BotEvent>>,
}

#[derive(Default)]
pub struct FanoutBroadcaster {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
}

impl FanoutBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener with the default queue capacity
    pub fn subscribe(&self, name: impl Into<String>) -> mpsc::Receiver<Arc<BotEvent>> {
        self.subscribe_with_capacity(name, DEFAULT_LISTENER_CAPACITY)
    }

    pub fn subscribe_with_capacity(
        &self,
        name: impl Into<String>,
        capacity: usize,
    ) -> mpsc::Receiver<Arc<BotEvent>> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let listener = Listener {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            sender,
        };

        debug!(listener = %listener.name, capacity = capacity, "Listener subscribed");
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        receiver
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Broadcaster for FanoutBroadcaster {
    fn publish(&self, event: BotEvent) {
        let kind = event.kind();
        let event = Arc::new(event);
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);

        listeners.retain(|listener| match listener.sender.try_send(Arc::clone(&event)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    listener = %listener.name,
                    listener_id = listener.id,
                    event = kind,
                    "Listener queue full, dropping listener"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(
                    listener = %listener.name,
                    listener_id = listener.id,
                    "Listener gone, removing"
                );
                false
            }
        });
    }
}
