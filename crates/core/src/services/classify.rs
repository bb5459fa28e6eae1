//! Success / retry / give-up decisions for a single debugger attempt.

use crate::model::{DebugSession, DebuggerKind, ParsedTrace, Report, ReportKind};
use crate::services::report::ReportAssembler;

/// Result of classifying one debugger attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// A termination line was found; the report holds the assembled trace.
    Success(Report),
    /// No usable trace; the report explains the failure.
    ParseFailure(Report),
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Success(_))
    }

    pub fn into_report(self) -> Report {
        match self {
            Attempt::Success(report) | Attempt::ParseFailure(report) => report,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FailureClassifier {
    /// Error text longer than this is summarized instead of echoed.
    pub max_error_chars: usize,
}

impl FailureClassifier {
    pub fn new(max_error_chars: usize) -> Self {
        Self { max_error_chars }
    }

    pub fn classify(
        &self,
        trace: &ParsedTrace,
        session: &DebugSession,
        debugger: DebuggerKind,
        assembler: &ReportAssembler,
    ) -> Attempt {
        if session.timed_out || trace.is_parse_failure() {
            tracing::debug!(
                %debugger,
                timed_out = session.timed_out,
                "debugger output not parseable"
            );
            return Attempt::ParseFailure(self.parse_failure(&session.stderr, debugger));
        }
        Attempt::Success(assembler.assemble(trace, debugger))
    }

    /// Failure report for a debugger whose output had no termination line.
    pub fn parse_failure(&self, errors: &str, debugger: DebuggerKind) -> Report {
        let label = debugger.label();
        let summary = format!("Parse failure on {label} output");
        let details = if errors.chars().count() > self.max_error_chars {
            tracing::warn!(%debugger, "error output over threshold, suppressing it");
            format!(
                "Over {} error characters printed - suspecting binary output",
                self.max_error_chars
            )
        } else {
            format!(
                "{label} backtrace command failed : Stack trace not produced for crash\n\
                 Errors from {label}:\n{errors}"
            )
        };
        Report { summary, details, binary: None, kind: ReportKind::ParseFailure { debugger } }
    }

    /// Merge the failure reports of both debuggers into one.
    pub fn combine(primary: &Report, secondary: &Report) -> Report {
        let (first, second) = match (&primary.kind, &secondary.kind) {
            (
                ReportKind::ParseFailure { debugger: first },
                ReportKind::ParseFailure { debugger: second },
            ) => (first.label(), second.label()),
            _ => (DebuggerKind::Gdb.label(), DebuggerKind::Dbx.label()),
        };
        Report {
            summary: format!("Parse failure from both {first} and {second}"),
            details: format!("{}{}", primary.details, secondary.details),
            binary: None,
            kind: ReportKind::CombinedParseFailure,
        }
    }
}
