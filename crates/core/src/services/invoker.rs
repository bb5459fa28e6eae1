use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::ToolPaths;
use crate::model::{DebugSession, DebuggerKind};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long pipe readers may lag behind a killed or exited debugger.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum InvokeError {
    /// The debugger executable could not be launched (typically: not installed).
    #[error("Failed to launch {kind} at {}: {source}", path.display())]
    Unavailable {
        kind: DebuggerKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {kind} command file: {source}")]
    CommandFile {
        kind: DebuggerKind,
        #[source]
        source: io::Error,
    },
    #[error("Failed while waiting for {kind}: {source}")]
    Wait {
        kind: DebuggerKind,
        #[source]
        source: io::Error,
    },
}

impl InvokeError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, InvokeError::Unavailable { .. })
    }
}

/// Produces a captured debugger session for a binary/dump pair.
///
/// [`DebuggerInvoker`] is the real implementation; tests substitute canned sessions.
pub trait SessionSource: Send + Sync {
    fn invoke(
        &self,
        kind: DebuggerKind,
        dump: &Path,
        binary: &Path,
    ) -> Result<DebugSession, InvokeError>;
}

/// Runs gdb or dbx as a child process, one process per call, no retries.
#[derive(Debug, Clone)]
pub struct DebuggerInvoker {
    tools: ToolPaths,
    timeout: Option<Duration>,
}

impl DebuggerInvoker {
    pub fn new(tools: ToolPaths, timeout: Option<Duration>) -> Self {
        Self { tools, timeout }
    }

    fn invoke_gdb(&self, dump: &Path, binary: &Path) -> Result<DebugSession, InvokeError> {
        // Removed on drop, including when the launch below fails.
        let script = write_command_file()?;
        let program = self.tools.debugger(DebuggerKind::Gdb);
        let mut cmd = Command::new(program);
        cmd.args(["-q", "-batch", "-x"]).arg(&*script).arg(binary).arg(dump);
        run_captured(cmd, DebuggerKind::Gdb, program, self.timeout)
    }

    fn invoke_dbx(&self, dump: &Path, binary: &Path) -> Result<DebugSession, InvokeError> {
        let program = self.tools.debugger(DebuggerKind::Dbx);
        let mut cmd = Command::new(program);
        cmd.args(["-f", "-q", "-c", "where; quit"]).arg(binary).arg(dump).stdin(Stdio::null());
        run_captured(cmd, DebuggerKind::Dbx, program, self.timeout)
    }
}

impl SessionSource for DebuggerInvoker {
    fn invoke(
        &self,
        kind: DebuggerKind,
        dump: &Path,
        binary: &Path,
    ) -> Result<DebugSession, InvokeError> {
        tracing::debug!(
            %kind,
            dump = %dump.display(),
            binary = %binary.display(),
            "invoking debugger"
        );
        match kind {
            DebuggerKind::Gdb => self.invoke_gdb(dump, binary),
            DebuggerKind::Dbx => self.invoke_dbx(dump, binary),
        }
    }
}

/// One-line gdb script requesting a full backtrace.
fn write_command_file() -> Result<tempfile::TempPath, InvokeError> {
    let mut file = tempfile::Builder::new()
        .prefix("crashsift-")
        .suffix("coreCommands.gdb")
        .tempfile()
        .map_err(|source| InvokeError::CommandFile { kind: DebuggerKind::Gdb, source })?;
    file.write_all(b"bt\n")
        .and_then(|()| file.flush())
        .map_err(|source| InvokeError::CommandFile { kind: DebuggerKind::Gdb, source })?;
    Ok(file.into_temp_path())
}

fn run_captured(
    mut cmd: Command,
    kind: DebuggerKind,
    program: &Path,
    timeout: Option<Duration>,
) -> Result<DebugSession, InvokeError> {
    // Own process group, so the watchdog also reaches helpers the debugger forked.
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| InvokeError::Unavailable { kind, path: program.to_path_buf(), source })?;

    // Drain both pipes while waiting; a full pipe blocks the child.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let started = Instant::now();
    let (status, timed_out) = wait_with_deadline(&mut child, timeout)
        .map_err(|source| InvokeError::Wait { kind, source })?;

    // Without a watchdog, wait for the pipes to close however long that takes.
    let drain_until = timeout
        .and_then(|limit| started.checked_add(limit))
        .map(|deadline| deadline.max(Instant::now()) + DRAIN_GRACE);
    let stdout = collect(stdout, drain_until);
    let mut stderr = collect(stderr, drain_until);
    if timed_out {
        let limit = timeout.unwrap_or_default();
        tracing::warn!(%kind, ?limit, "debugger did not exit in time, killed");
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!("{} killed after {limit:?} without exiting", kind.label()));
    }

    Ok(DebugSession {
        stdout,
        stderr,
        exit_code: status.and_then(|s| s.code()),
        timed_out,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error just truncates what we keep.
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Output of a pipe reader. A reader still blocked at `until` is abandoned; some
/// process outside our reach holds the pipe open.
fn collect(reader: Option<mpsc::Receiver<Vec<u8>>>, until: Option<Instant>) -> String {
    let bytes = reader
        .and_then(|rx| match until {
            Some(until) => rx.recv_timeout(until.saturating_duration_since(Instant::now())).ok(),
            None => rx.recv().ok(),
        })
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Wait for the child, killing it once `timeout` elapses. Returns `(status, timed_out)`.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Option<Duration>,
) -> io::Result<(Option<ExitStatus>, bool)> {
    let Some(deadline) = timeout.and_then(|limit| Instant::now().checked_add(limit)) else {
        return child.wait().map(|status| (Some(status), false));
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        let now = Instant::now();
        if now >= deadline {
            // The child may have exited between try_wait and kill.
            kill_process_group(child);
            let _ = child.kill();
            let status = child.wait().ok();
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions; the group was created by
    // `process_group(0)` at spawn and is led by the still-unreaped child.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_file_contains_backtrace_and_is_removed_on_drop() {
        let script = write_command_file().expect("script");
        let path = script.to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "bt\n");
        drop(script);
        assert!(!path.exists());
    }

    #[test]
    fn missing_debugger_is_unavailable() {
        let tools = ToolPaths {
            gdb: PathBuf::from("/nonexistent/crashsift/gdb"),
            ..ToolPaths::default()
        };
        let invoker = DebuggerInvoker::new(tools, None);
        let err = invoker
            .invoke(DebuggerKind::Gdb, Path::new("core"), Path::new("bin"))
            .unwrap_err();
        assert!(err.is_unavailable(), "unexpected error: {err}");
    }
}
