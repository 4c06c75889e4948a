pub mod bot_store;
pub mod broadcaster;
pub mod process_executor;
pub mod process_sampler;

pub use bot_store::{BotStatusUpdate, BotStore};
pub use broadcaster::Broadcaster;
pub use process_executor::{OutputLine, OutputStream, ProcessExecutor, SpawnConfig, SpawnResult};
pub use process_sampler::{ProcessSampler, SystemSampler};

#[cfg(test)]
pub mod mocks;
