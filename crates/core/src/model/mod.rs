//! Core data model for a single dump analysis run.
//!
//! Every value here is created and consumed within one run; nothing is persisted
//! or shared across runs.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A core dump on disk together with its size at the time it was inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreDump {
    pub path: PathBuf,
    pub size: u64,
}

impl CoreDump {
    /// Stat the dump and record its size.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        Ok(Self { path, size })
    }

    /// Zero-byte dumps are terminal: nothing further can be learned from them.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Best guess at the executable that produced a dump.
///
/// `path` may be empty when no candidate was found at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    pub exists: bool,
}

impl ResolvedBinary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = path.is_file();
        Self { path, exists }
    }

    pub fn display_name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

/// The two supported post-mortem debuggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuggerKind {
    /// gdb, driven by a one-line command file.
    Gdb,
    /// dbx, driven by an inline command sequence.
    Dbx,
}

impl DebuggerKind {
    /// Label used in report text ("GDB" / "DBX").
    pub fn label(self) -> &'static str {
        match self {
            DebuggerKind::Gdb => "GDB",
            DebuggerKind::Dbx => "DBX",
        }
    }

    /// The debugger tried when this one fails to parse, if any.
    pub fn fallback(self) -> Option<DebuggerKind> {
        match self {
            DebuggerKind::Gdb => Some(DebuggerKind::Dbx),
            DebuggerKind::Dbx => None,
        }
    }
}

impl fmt::Display for DebuggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebuggerKind::Gdb => f.write_str("gdb"),
            DebuggerKind::Dbx => f.write_str("dbx"),
        }
    }
}

/// Captured output of one debugger invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSession {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Set when the watchdog killed the debugger.
    pub timed_out: bool,
}

impl DebugSession {
    /// Build a session from captured text, as if the debugger exited cleanly.
    pub fn from_output(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self { stdout: stdout.into(), stderr: stderr.into(), exit_code: Some(0), timed_out: false }
    }
}

/// Structured result of scanning debugger output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTrace {
    pub signal_description: String,
    pub summary_line: String,
    /// Frames in the order the debugger printed them.
    pub frames: Vec<String>,
}

impl ParsedTrace {
    /// A trace without a termination line cannot be reported.
    pub fn is_parse_failure(&self) -> bool {
        self.summary_line.is_empty()
    }
}

/// Outcome classification carried alongside the report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReportKind {
    Trace { debugger: DebuggerKind },
    EmptyDump,
    BinaryNotFound,
    ParseFailure { debugger: DebuggerKind },
    CombinedParseFailure,
}

/// Final two-part crash report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    pub kind: ReportKind,
}

impl Report {
    pub fn with_binary(mut self, binary: Option<String>) -> Self {
        self.binary = binary;
        self
    }
}
