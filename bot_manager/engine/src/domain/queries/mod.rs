pub mod bot_view;
pub mod log_query;

pub use bot_view::BotView;
pub use log_query::LogQuery;
