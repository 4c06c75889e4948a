//! Tokio Process Executor
//! Real process spawning, reaping and signalling

use crate::constants::supervisor::OUTPUT_CHANNEL_CAPACITY;
use crate::domain::ports::{
    OutputLine, OutputStream, ProcessExecutor, SpawnConfig, SpawnResult,
};
use crate::domain::DomainError;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Executor backed by `tokio::process`
///
/// Every child gets its own session (and therefore process group) so the
/// whole tree can be signalled at once. A background task per child reaps it
/// and publishes the exit code.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn exit_code(status: ExitStatus) -> i32 {
        if let Some(code) = status.code() {
            return code;
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return 128 + signal;
            }
        }

        -1
    }

    fn spawn_reaper(mut child: Child, pid: u32) -> watch::Receiver<Option<i32>> {
        let (tx, rx) = watch::channel(None);

        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => {
                    let code = Self::exit_code(status);
                    debug!(pid = pid, exit_code = code, "Process exited");
                    code
                }
                Err(e) => {
                    error!(pid = pid, error = %e, "Failed to wait for process");
                    -1
                }
            };
            let _ = tx.send(Some(code));
        });

        rx
    }

    fn spawn_line_reader<R>(reader: R, stream: OutputStream, tx: mpsc::Sender<OutputLine>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            // Keep draining until EOF so the child never sees a closed pipe
            let mut forwarding = true;
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if !forwarding {
                            continue;
                        }
                        let line = decode_line(&buf);
                        if tx.send(OutputLine { stream, line }).await.is_err() {
                            debug!(stream = ?stream, "Output receiver closed, discarding output");
                            forwarding = false;
                        }
                    }
                    Err(e) => {
                        warn!(stream = ?stream, error = %e, "Failed to read process output");
                        break;
                    }
                }
            }
        });
    }

    #[cfg(unix)]
    fn signal_from(signal: i32) -> Result<nix::sys::signal::Signal, DomainError> {
        nix::sys::signal::Signal::try_from(signal)
            .map_err(|e| DomainError::InvalidCommand(format!("Invalid signal {}: {}", signal, e)))
    }
}

/// Strip the line terminator; invalid UTF-8 is replaced, not rejected
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult, DomainError> {
        info!(
            command = %config.command,
            args = ?config.args,
            "Spawning process"
        );

        if config.command.is_empty() {
            return Err(DomainError::InvalidCommand("Empty command".to_string()));
        }

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        if let Some(ref dir) = config.working_dir {
            debug!(working_dir = %dir, "Setting working directory");
            cmd.current_dir(dir);
        }

        // Inherited environment, overridden per key
        if !config.env_vars.is_empty() {
            debug!(count = config.env_vars.len(), "Setting environment variables");
            cmd.envs(config.env_vars.iter().map(|(k, v)| (k, v)));
        }

        cmd.stdin(Stdio::null());
        if config.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                // New session and process group; failure only means we already lead one
                let _ = libc::setsid();
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|e| {
            error!(
                command = %config.command,
                error = %e,
                "Failed to spawn process"
            );
            DomainError::SpawnFailure(format!("{}: {}", config.command, e))
        })?;

        let pid = child
            .id()
            .ok_or_else(|| DomainError::SpawnFailure("process exited before its PID was read".to_string()))?;

        let output = if config.capture_output {
            let (tx, rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
            if let Some(stdout) = child.stdout.take() {
                Self::spawn_line_reader(stdout, OutputStream::Stdout, tx.clone());
            }
            if let Some(stderr) = child.stderr.take() {
                Self::spawn_line_reader(stderr, OutputStream::Stderr, tx);
            }
            Some(rx)
        } else {
            None
        };

        info!(pid = pid, "Process spawned successfully");

        Ok(SpawnResult {
            pid,
            exit: Self::spawn_reaper(child, pid),
            output,
        })
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        info!(pid = pid, signal = signal, "Killing process");

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal;
            use nix::unistd::Pid;

            match signal::kill(Pid::from_raw(pid as i32), Self::signal_from(signal)?) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => {
                    warn!(pid = pid, signal = signal, error = %e, "Failed to send signal to process");
                    Err(DomainError::TerminationFailure(format!(
                        "Failed to send signal {} to {}: {}",
                        signal, pid, e
                    )))
                }
            }
        }

        #[cfg(not(unix))]
        {
            Err(DomainError::TerminationFailure(
                "Process signalling not implemented on this platform".to_string(),
            ))
        }
    }

    async fn kill_group(&self, pid: u32, signal: i32) -> Result<(), DomainError> {
        info!(pid = pid, signal = signal, "Killing process group");

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal;
            use nix::unistd::Pid;

            match signal::killpg(Pid::from_raw(pid as i32), Self::signal_from(signal)?) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => {
                    warn!(pid = pid, signal = signal, error = %e, "Failed to send signal to process group");
                    Err(DomainError::TerminationFailure(format!(
                        "Failed to send signal {} to process group {}: {}",
                        signal, pid, e
                    )))
                }
            }
        }

        #[cfg(not(unix))]
        {
            Err(DomainError::TerminationFailure(
                "Process signalling not implemented on this platform".to_string(),
            ))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn config(command: &str, args: &[&str]) -> SpawnConfig {
        SpawnConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: Some("/tmp".to_string()),
            env_vars: vec![],
            capture_output: false,
        }
    }

    async fn wait_exit(exit: &mut watch::Receiver<Option<i32>>) -> i32 {
        let code: Option<i32> = *timeout(Duration::from_secs(5), exit.wait_for(|c| c.is_some()))
            .await
            .expect("process did not exit")
            .expect("reaper dropped");
        code.unwrap()
    }

    #[tokio::test]
    async fn test_spawn_simple_process() {
        let executor = TokioProcessExecutor::new();

        let mut result = executor.spawn(config("/bin/sh", &["-c", "exit 3"])).await.unwrap();

        assert!(result.pid > 0);
        assert!(result.output.is_none());
        assert_eq!(wait_exit(&mut result.exit).await, 3);
    }

    #[tokio::test]
    async fn test_spawn_invalid_command() {
        let executor = TokioProcessExecutor::new();

        let result = executor.spawn(config("/nonexistent/command", &[])).await;

        assert!(matches!(result, Err(DomainError::SpawnFailure(_))));
    }

    #[tokio::test]
    async fn test_spawn_invalid_working_dir() {
        let executor = TokioProcessExecutor::new();
        let mut cfg = config("/bin/true", &[]);
        cfg.working_dir = Some("/nonexistent/dir".to_string());

        assert!(matches!(
            executor.spawn(cfg).await,
            Err(DomainError::SpawnFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_spawn_with_env_vars_and_capture() {
        let executor = TokioProcessExecutor::new();
        let mut cfg = config("/bin/sh", &["-c", "echo $BM_TEST_VAR; echo err >&2"]);
        cfg.env_vars = vec![("BM_TEST_VAR".to_string(), "hello".to_string())];
        cfg.capture_output = true;

        let result = executor.spawn(cfg).await.unwrap();
        let mut output = result.output.unwrap();

        let mut lines = Vec::new();
        while let Ok(Some(line)) = timeout(Duration::from_secs(5), output.recv()).await {
            lines.push(line);
        }

        assert!(lines.contains(&OutputLine {
            stream: OutputStream::Stdout,
            line: "hello".to_string(),
        }));
        assert!(lines.contains(&OutputLine {
            stream: OutputStream::Stderr,
            line: "err".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_kill_reports_signal_exit() {
        let executor = TokioProcessExecutor::new();
        let mut result = executor.spawn(config("/bin/sleep", &["60"])).await.unwrap();

        executor.kill(result.pid, libc::SIGTERM).await.unwrap();

        assert_eq!(wait_exit(&mut result.exit).await, 128 + libc::SIGTERM);
    }

    #[tokio::test]
    async fn test_kill_group_reaches_children() {
        let executor = TokioProcessExecutor::new();
        let mut result = executor
            .spawn(config("/bin/sh", &["-c", "trap '' TERM; sleep 60"]))
            .await
            .unwrap();

        // Give the shell time to install its trap
        tokio::time::sleep(Duration::from_millis(200)).await;
        executor.kill(result.pid, libc::SIGTERM).await.unwrap();
        assert!(timeout(Duration::from_millis(300), result.exit.wait_for(|c| c.is_some()))
            .await
            .is_err());

        executor.kill_group(result.pid, libc::SIGKILL).await.unwrap();
        assert_eq!(wait_exit(&mut result.exit).await, 128 + libc::SIGKILL);
    }

    #[tokio::test]
    async fn test_kill_vanished_process_is_ok() {
        let executor = TokioProcessExecutor::new();
        let mut result = executor.spawn(config("/bin/true", &[])).await.unwrap();
        wait_exit(&mut result.exit).await;

        assert!(executor.kill(result.pid, libc::SIGTERM).await.is_ok());
        assert!(executor.kill_group(result.pid, libc::SIGKILL).await.is_ok());
    }

    #[test]
    fn test_decode_line_is_lossy() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"crlf\r\n"), "crlf");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"caf\xe9\n"), "caf\u{fffd}");
    }

    #[tokio::test]
    async fn test_invalid_utf8_does_not_stop_capture() {
        let executor = TokioProcessExecutor::new();
        let mut cfg = config("/bin/sh", &["-c", "printf 'caf\\351\\n'; echo after"]);
        cfg.capture_output = true;

        let mut result = executor.spawn(cfg).await.unwrap();
        let mut output = result.output.take().unwrap();

        let mut lines = Vec::new();
        while let Ok(Some(line)) = timeout(Duration::from_secs(5), output.recv()).await {
            lines.push(line.line);
        }

        assert_eq!(lines, vec!["caf\u{fffd}".to_string(), "after".to_string()]);
        assert_eq!(wait_exit(&mut result.exit).await, 0);
    }
}
