pub mod append_log;
pub mod create_bot;
pub mod load_config;
pub mod start_bot;
pub mod update_bot;

pub use append_log::AppendLogCommand;
pub use create_bot::{CreateBotCommand, CreateBotResponse};
pub use load_config::{LoadConfigCommand, LoadConfigResponse};
pub use start_bot::StartBotResponse;
pub use update_bot::UpdateBotCommand;
