//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the domain layer.
//!
//! ## Adapters
//!
//! - `TokioProcessExecutor`: real process spawning and signalling
//! - `SysinfoSampler`: per-process and host metrics via sysinfo
//! - `InMemoryBotStore`: thread-safe in-memory document store
//! - `FanoutBroadcaster`: bounded per-listener event fan-out
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bm_engine::infrastructure::{InMemoryBotStore, SysinfoSampler, TokioProcessExecutor};
//! use std::sync::Arc;
//!
//! let executor = Arc::new(TokioProcessExecutor::new());
//! let sampler = Arc::new(SysinfoSampler::new());
//! let store = Arc::new(InMemoryBotStore::new());
//!
//! // Wire into the supervisor...
//! ```

pub mod config;
pub mod fanout_broadcaster;
pub mod in_memory_store;
pub mod sysinfo_sampler;
pub mod tokio_executor;

pub use config::{get_default_config_path, load_config_from_path, BotConfig, Config};
pub use fanout_broadcaster::FanoutBroadcaster;
pub use in_memory_store::InMemoryBotStore;
pub use sysinfo_sampler::SysinfoSampler;
pub use tokio_executor::TokioProcessExecutor;
