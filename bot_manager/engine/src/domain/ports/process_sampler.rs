//! Sampler ports for process and host resource usage

use crate::domain::{DomainError, HostUsage, ProcessSample};
use async_trait::async_trait;

#[async_trait]
pub trait ProcessSampler: Send + Sync {
    /// Sample a native PID
    ///
    /// Returns `DomainError::SampleFailure(pid)` when the process no longer
    /// exists, including zombies awaiting reaping.
    async fn sample(&self, pid: u32) -> Result<ProcessSample, DomainError>;
}

#[async_trait]
pub trait SystemSampler: Send + Sync {
    async fn sample(&self) -> Result<HostUsage, DomainError>;
}
