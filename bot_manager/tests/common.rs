//! Shared harness for the e2e tests
//!
//! Every test builds its own [`TestManager`]: a full `Application` wired to
//! real processes and sysinfo sampling, with short termination timeouts.
//! Dropping the guard SIGKILLs the process group of anything still
//! supervised, so a failing assertion never leaks children.
//!
//! ```rust,ignore
//! #[tokio::test(flavor = "multi_thread")]
//! async fn my_test() {
//!     let manager = TestManager::new();
//!     let id = manager.create_bot(&unique_bot_name(), "/bin/sleep", &["100"]).await;
//!     manager.app().supervisor().start(&id).await.unwrap();
//! }
//! ```

use bm_engine::application::Application;
use bm_engine::domain::services::SupervisorSettings;
use bm_engine::domain::{BotId, BotStatus, CreateBotCommand, LogEntry, LogQuery};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const TEST_WORKING_DIR: &str = "/tmp";

static NAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn test_settings() -> SupervisorSettings {
    SupervisorSettings {
        stop_grace: Duration::from_secs(1),
        kill_timeout: Duration::from_secs(3),
        restart_delay: Duration::from_millis(100),
    }
}

/// Bot names unique across the tests of one binary
pub fn unique_bot_name() -> String {
    format!(
        "e2e-bot-{}-{}",
        std::process::id(),
        NAME_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

pub struct TestManager {
    app: Application,
}

impl TestManager {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: SupervisorSettings) -> Self {
        Self {
            app: Application::new(settings),
        }
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub async fn create_bot(&self, name: &str, command: &str, args: &[&str]) -> BotId {
        let mut cmd = CreateBotCommand::new(name, command);
        cmd.args = args.iter().map(|a| a.to_string()).collect();
        cmd.working_dir = Some(TEST_WORKING_DIR.to_string());
        self.app
            .create_bot()
            .execute(cmd)
            .await
            .expect("failed to create bot")
            .bot_id
    }

    /// Create and start a bot, returning its id and PID
    pub async fn create_and_start(&self, command: &str, args: &[&str]) -> (BotId, u32) {
        let id = self.create_bot(&unique_bot_name(), command, args).await;
        let started = self
            .app
            .supervisor()
            .start(&id)
            .await
            .expect("failed to start bot");
        (id, started.pid)
    }

    pub async fn status(&self, id: &BotId) -> BotStatus {
        self.app
            .store()
            .find_bot(id)
            .await
            .expect("bot not found")
            .status()
    }

    pub async fn logs(&self, id: &BotId) -> Vec<LogEntry> {
        self.app
            .bot_logs()
            .query(LogQuery::new(id.clone()).limit(1000))
            .await
            .expect("failed to query logs")
    }

    pub async fn has_log(&self, id: &BotId, needle: &str) -> bool {
        self.logs(id).await.iter().any(|l| l.message.contains(needle))
    }

    /// Run reconciliation passes until the bot reaches `expected`
    pub async fn wait_for_status(&self, id: &BotId, expected: BotStatus, timeout: Duration) -> bool {
        let supervisor = self.app.supervisor();
        wait_until(timeout, || {
            let supervisor = supervisor.clone();
            async move {
                supervisor.reconcile_once().await;
                self.status(id).await == expected
            }
        })
        .await
    }
}

impl Default for TestManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestManager {
    fn drop(&mut self) {
        let supervisor = self.app.supervisor();
        let registry = supervisor.registry();
        for bot_id in registry.bot_ids() {
            if let Some(handle) = registry.get(&bot_id) {
                let _ = signal::killpg(Pid::from_raw(handle.pid() as i32), Signal::SIGKILL);
            }
        }
    }
}

/// Poll `check` every 50ms until it holds or `timeout` elapses
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Signal-0 probe; a reaped PID reports false
pub fn process_alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

pub fn send_signal(pid: u32, sig: Signal) {
    signal::kill(Pid::from_raw(pid as i32), sig).expect("failed to signal process");
}
