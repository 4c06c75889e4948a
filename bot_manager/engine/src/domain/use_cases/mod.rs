pub mod bot_logs;
pub mod create_bot;
pub mod delete_bot;
pub mod list_bots;
pub mod load_config;
pub mod system_metrics;
pub mod update_bot;

pub use bot_logs::{BotLogs, BotLogsUseCase};
pub use create_bot::{CreateBot, CreateBotUseCase};
pub use delete_bot::{DeleteBot, DeleteBotUseCase};
pub use list_bots::{ListBots, ListBotsUseCase};
pub use load_config::{LoadConfig, LoadConfigUseCase};
pub use system_metrics::{GetSystemMetrics, GetSystemMetricsUseCase};
pub use update_bot::{UpdateBot, UpdateBotUseCase};
