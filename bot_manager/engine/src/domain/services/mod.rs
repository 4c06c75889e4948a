pub mod bot_locks;
pub mod handle_registry;
pub mod log_sink;
pub mod reconciliation;
pub mod status_broadcast;
pub mod supervisor;

pub use bot_locks::BotLocks;
pub use handle_registry::{HandleRegistry, SupervisionHandle};
pub use log_sink::LogSink;
pub use reconciliation::ReconciliationService;
pub use status_broadcast::StatusBroadcastService;
pub use supervisor::{BotSupervisor, ReconcileReport, SupervisorSettings};
