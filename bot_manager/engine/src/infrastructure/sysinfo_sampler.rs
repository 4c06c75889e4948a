//! sysinfo-backed samplers
//!
//! Per-process CPU/memory/start time and host-wide utilization. CPU usage is
//! measured between two refreshes of the same PID, so the first sample of a
//! process reports 0.

use crate::domain::ports::{ProcessSampler, SystemSampler};
use crate::domain::{DomainError, HostUsage, ProcessSample};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, UNIX_EPOCH};
use sysinfo::{
    Disks, Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, RefreshKind, System,
};
use tracing::debug;

struct SamplerState {
    system: System,
    /// PIDs currently held by `system`; refreshed together so dead ones get dropped
    tracked: HashSet<Pid>,
}

/// Filesystem whose usage is reported as disk usage
const DISK_ROOT: &str = "/";

pub struct SysinfoSampler {
    state: Mutex<SamplerState>,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SamplerState {
                system: System::new_with_specifics(RefreshKind::nothing()),
                tracked: HashSet::new(),
            }),
        }
    }

    /// Number of PIDs kept between samples
    pub fn tracked_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tracked
            .len()
    }

    fn sample_pid(&self, raw_pid: u32) -> Result<ProcessSample, DomainError> {
        let pid = Pid::from_u32(raw_pid);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let SamplerState { system, tracked } = &mut *state;

        tracked.insert(pid);
        let pids: Vec<Pid> = tracked.iter().copied().collect();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        tracked.retain(|p| system.process(*p).is_some());
        system.refresh_memory();

        let Some(process) = system.process(pid) else {
            return Err(DomainError::SampleFailure(raw_pid));
        };
        // Zombies and dead tasks are gone as far as the bot is concerned
        if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
            return Err(DomainError::SampleFailure(raw_pid));
        }

        let total_memory = system.total_memory();
        let memory_percent = if total_memory > 0 {
            process.memory() as f64 / total_memory as f64 * 100.0
        } else {
            0.0
        };

        Ok(ProcessSample {
            cpu_percent: f64::from(process.cpu_usage()),
            memory_percent,
            start_time: UNIX_EPOCH + Duration::from_secs(process.start_time()),
        })
    }

    fn host_usage(&self) -> Result<HostUsage, DomainError> {
        let (cpu_percent, memory_percent) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let system = &mut state.system;
            system.refresh_cpu_usage();
            system.refresh_memory();

            let total = system.total_memory();
            let memory_percent = if total > 0 {
                system.used_memory() as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            (f64::from(system.global_cpu_usage()), memory_percent)
        };

        Ok(HostUsage {
            cpu_percent,
            memory_percent,
            disk_percent: self.disk_percent(),
        })
    }

    /// Usage of the disk mounted closest to `DISK_ROOT`, or of all disks
    /// when none contains it (overlay roots are not listed)
    fn disk_percent(&self) -> f64 {
        let root = Path::new(DISK_ROOT);
        let disks = Disks::new_with_refreshed_list();
        let (total, available) = match disks
            .list()
            .iter()
            .filter(|d| root.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
        {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => disks.list().iter().fold((0, 0), |(t, a), d| {
                (t + d.total_space(), a + d.available_space())
            }),
        };

        if total == 0 {
            debug!(root = DISK_ROOT, "No disk usage available");
            return 0.0;
        }
        total.saturating_sub(available) as f64 / total as f64 * 100.0
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSampler for SysinfoSampler {
    async fn sample(&self, pid: u32) -> Result<ProcessSample, DomainError> {
        let result = self.sample_pid(pid);
        if let Err(DomainError::SampleFailure(_)) = result {
            debug!(pid = pid, "Process no longer exists");
        }
        result
    }
}

#[async_trait]
impl SystemSampler for SysinfoSampler {
    async fn sample(&self) -> Result<HostUsage, DomainError> {
        self.host_usage()
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::SystemTime;

    #[tokio::test]
    async fn test_sample_self() {
        let sampler = SysinfoSampler::new();

        let first = ProcessSampler::sample(&sampler, std::process::id())
            .await
            .unwrap();
        assert!(first.cpu_percent >= 0.0);
        assert!(first.memory_percent > 0.0);
        assert!(first.start_time <= SystemTime::now());

        let second = ProcessSampler::sample(&sampler, std::process::id())
            .await
            .unwrap();
        assert!(second.cpu_percent >= 0.0);
        assert_eq!(second.start_time, first.start_time);
    }

    #[tokio::test]
    async fn test_missing_pid_is_gone() {
        let sampler = SysinfoSampler::new();

        let result = ProcessSampler::sample(&sampler, 999_999_999).await;

        assert_eq!(result, Err(DomainError::SampleFailure(999_999_999)));
        assert_eq!(sampler.tracked_count(), 0);
    }

    #[tokio::test]
    async fn test_zombie_is_gone() {
        let mut child = Command::new("/bin/true").spawn().unwrap();
        let pid = child.id();
        // Not reaped yet: the child stays a zombie
        std::thread::sleep(Duration::from_millis(200));

        let sampler = SysinfoSampler::new();
        let result = ProcessSampler::sample(&sampler, pid).await;

        child.wait().unwrap();
        assert_eq!(result, Err(DomainError::SampleFailure(pid)));
    }

    #[tokio::test]
    async fn test_exited_pids_are_forgotten() {
        let sampler = SysinfoSampler::new();
        let mut child = Command::new("/bin/sleep").arg("30").spawn().unwrap();

        ProcessSampler::sample(&sampler, child.id()).await.unwrap();
        ProcessSampler::sample(&sampler, std::process::id())
            .await
            .unwrap();
        assert_eq!(sampler.tracked_count(), 2);

        child.kill().unwrap();
        child.wait().unwrap();

        // Sampling anything else drops the dead PID
        ProcessSampler::sample(&sampler, std::process::id())
            .await
            .unwrap();
        assert_eq!(sampler.tracked_count(), 1);
    }

    #[tokio::test]
    async fn test_host_usage() {
        let sampler = SysinfoSampler::new();

        let usage = SystemSampler::sample(&sampler).await.unwrap();

        assert!(usage.cpu_percent >= 0.0);
        assert!((0.0..=100.0).contains(&usage.memory_percent));
        assert!((0.0..=100.0).contains(&usage.disk_percent));
    }
}
