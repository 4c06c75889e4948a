pub mod bot;

pub use bot::{Bot, BotBuilder};
