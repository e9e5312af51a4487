//! Command execution: denylist gate, spawn, output capture, timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::denylist;
use super::error::{SandboxError, SandboxResult};
use crate::obs;

/// Configuration for sandboxed command execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Wall-clock limit for a single command (milliseconds).
    pub timeout_ms: u64,
    /// Skip the denylist for every call made through this sandbox.
    pub allow_unsafe: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            allow_unsafe: false,
        }
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory; the sandbox's shared directory when `None`.
    pub cwd: Option<PathBuf>,
    /// Timeout override (milliseconds).
    pub timeout_ms: Option<u64>,
    /// Skip the denylist for this call.
    pub allow_unsafe: bool,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl ExecOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn allow_unsafe(mut self) -> Self {
        self.allow_unsafe = true;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandExecutionRecord {
    /// Command line as requested.
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `-1` when refused, not spawned, killed or signalled.
    pub exit_code: i32,
    pub cwd: PathBuf,
    pub duration_ms: u64,
    pub success: bool,
    pub timed_out: bool,
    pub denied: bool,
    /// Child process id, when one was spawned.
    pub pid: Option<u32>,
}

impl CommandExecutionRecord {
    fn failure(command: String, cwd: PathBuf, stderr: String, started: Instant) -> Self {
        Self {
            command,
            stdout: String::new(),
            stderr,
            exit_code: -1,
            cwd,
            duration_ms: started.elapsed().as_millis() as u64,
            success: false,
            timed_out: false,
            denied: false,
            pid: None,
        }
    }
}

fn command_line(command: &str, args: &[String]) -> String {
    std::iter::once(command)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}

/// Resolve `path` against `base` and check that it names a directory.
pub async fn resolve_directory(base: &Path, path: &Path) -> SandboxResult<PathBuf> {
    let target = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let meta = tokio::fs::metadata(&target)
        .await
        .map_err(|source| SandboxError::InvalidDirectory {
            path: target.clone(),
            source,
        })?;
    if !meta.is_dir() {
        return Err(SandboxError::NotADirectory { path: target });
    }

    Ok(tokio::fs::canonicalize(&target).await.unwrap_or(target))
}

/// Denylisted, timeout-bounded external command execution.
///
/// Clones share one working directory. That directory is process-wide state:
/// a [`change_directory`](Self::change_directory) from any holder is seen by
/// every later call that does not pass its own `cwd`, and concurrent changes
/// race with the last writer winning. Agent code should prefer the
/// per-invocation directory on [`AgentContext`](crate::runtime::AgentContext).
#[derive(Debug, Clone)]
pub struct CommandSandbox {
    config: SandboxConfig,
    shared_cwd: Arc<Mutex<PathBuf>>,
}

impl Default for CommandSandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

impl CommandSandbox {
    /// Sandbox rooted at the process's current directory.
    pub fn new(config: SandboxConfig) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_working_directory(config, cwd)
    }

    pub fn with_working_directory(config: SandboxConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            shared_cwd: Arc::new(Mutex::new(cwd.into())),
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Current shared working directory.
    pub fn working_directory(&self) -> PathBuf {
        self.shared_cwd
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Change the shared working directory after checking the target is an
    /// existing directory. Relative paths resolve against the current value.
    pub async fn change_directory(&self, path: impl AsRef<Path>) -> SandboxResult<PathBuf> {
        let base = self.working_directory();
        let resolved = resolve_directory(&base, path.as_ref()).await?;

        *self
            .shared_cwd
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = resolved.clone();

        tracing::debug!(cwd = %resolved.display(), "sandbox working directory changed");
        Ok(resolved)
    }

    /// Run `command` with `args`. Always returns a record.
    ///
    /// Denylisted commands are refused without spawning unless unsafe
    /// execution is allowed by the call or the sandbox config. Stdout and
    /// stderr are captured in full. If the timeout elapses the child is killed
    /// and reaped; output captured before the deadline is kept.
    pub async fn execute(
        &self,
        command: &str,
        args: &[String],
        options: ExecOptions,
    ) -> CommandExecutionRecord {
        let started = Instant::now();
        let line = command_line(command, args);
        let cwd = options.cwd.clone().unwrap_or_else(|| self.working_directory());
        let timeout_ms = options.timeout_ms.unwrap_or(self.config.timeout_ms);

        if !(options.allow_unsafe || self.config.allow_unsafe) {
            if let Some(entry) = denylist::matched(command) {
                obs::emit_command_denied(&line, entry);
                let mut record = CommandExecutionRecord::failure(
                    line,
                    cwd,
                    format!(
                        "command '{command}' refused: matches denylisted pattern '{entry}' \
                         (destructive commands require an explicit unsafe override)"
                    ),
                    started,
                );
                record.denied = true;
                return record;
            }
        }

        let mut cmd = Command::new(command);
        cmd.args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command = %line, error = %e, "failed to spawn command");
                return CommandExecutionRecord::failure(
                    line,
                    cwd,
                    format!("failed to spawn '{command}': {e}"),
                    started,
                );
            }
        };

        let pid = child.id();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            let (out, err, status) = tokio::join!(
                drain(stdout_pipe, &mut stdout),
                drain(stderr_pipe, &mut stderr),
                child.wait(),
            );
            (out.and(err), status)
        })
        .await;

        let (exit_code, success, timed_out, note) = match outcome {
            Ok((io, Ok(status))) => {
                let note = io.err().map(|e| format!("output capture failed: {e}"));
                (status.code().unwrap_or(-1), status.success(), false, note)
            }
            Ok((_, Err(e))) => (-1, false, false, Some(format!("failed to wait for command: {e}"))),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(command = %line, error = %e, "failed to kill timed-out command");
                }
                obs::emit_command_timed_out(&line, timeout_ms);
                (-1, false, true, Some(format!("command timed out after {timeout_ms}ms")))
            }
        };

        let mut stderr = String::from_utf8_lossy(&stderr).into_owned();
        if let Some(note) = note {
            if !stderr.is_empty() && !stderr.ends_with('\n') {
                stderr.push('\n');
            }
            stderr.push_str(&note);
        }

        let record = CommandExecutionRecord {
            command: line,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr,
            exit_code,
            cwd,
            duration_ms: started.elapsed().as_millis() as u64,
            success,
            timed_out,
            denied: false,
            pid,
        };
        obs::emit_command_finished(&record.command, record.exit_code, record.duration_ms);
        record
    }
}
