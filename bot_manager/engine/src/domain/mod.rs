//! Domain layer
//! Entities, value objects, ports and the supervision core

pub mod commands;
pub mod entities;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;
pub mod use_cases;
pub mod value_objects;

pub use commands::{
    AppendLogCommand, CreateBotCommand, CreateBotResponse, LoadConfigCommand, LoadConfigResponse,
    StartBotResponse, UpdateBotCommand,
};
pub use entities::{Bot, BotBuilder};
pub use error::{DomainError, Result};
pub use queries::{BotView, LogQuery};
pub use value_objects::{
    format_uptime, BotEvent, BotId, BotStatus, BotType, HostUsage, LiveStats, LogEntry, LogLevel,
    LogSource, ProcessSample, StatusChange, SystemMetrics, SystemUpdate,
};
