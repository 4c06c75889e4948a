pub mod bot_id;
pub mod bot_status;
pub mod bot_type;
pub mod event;
pub mod log_entry;
pub mod process_sample;
pub mod rfc3339;
pub mod system_metrics;

pub use bot_id::BotId;
pub use bot_status::BotStatus;
pub use bot_type::BotType;
pub use event::{BotEvent, StatusChange, SystemUpdate};
pub use log_entry::{LogEntry, LogLevel, LogSource};
pub use process_sample::{format_uptime, LiveStats, ProcessSample};
pub use system_metrics::{HostUsage, SystemMetrics};
