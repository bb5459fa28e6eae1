//! Formatting of the final summary/details pair.

use crate::model::{DebuggerKind, ParsedTrace, Report, ReportKind};

/// Assembles successful traces into reports, capping the number of printed frames.
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    pub max_frames: usize,
}

impl ReportAssembler {
    pub fn new(max_frames: usize) -> Self {
        Self { max_frames }
    }

    pub fn assemble(&self, trace: &ParsedTrace, debugger: DebuggerKind) -> Report {
        let label = debugger.label();
        let shown = trace.frames.len().min(self.max_frames);
        let mut details = format!(
            "{}\nStack trace from {label} :\n{}",
            trace.summary_line,
            trace.frames[..shown].join("\n")
        );
        // Infinite recursion can produce enormous traces.
        if trace.frames.len() > self.max_frames {
            details.push_str(&format!(
                "\nStack trace print-out aborted after {} function calls",
                self.max_frames
            ));
        }
        Report {
            summary: trace.signal_description.clone(),
            details,
            binary: None,
            kind: ReportKind::Trace { debugger },
        }
    }
}

/// Report for a zero-byte dump.
pub fn empty_dump_report() -> Report {
    Report {
        summary: "Empty core file".to_string(),
        details: "Core file of zero size written - Stack trace not produced for crash\n\
                  Check your coredumpsize limit"
            .to_string(),
        binary: None,
        kind: ReportKind::EmptyDump,
    }
}

/// Report for a dump whose executable could not be located.
pub fn binary_not_found_report(attempted: &str) -> Report {
    Report {
        summary: "No binary found from core".to_string(),
        details: format!(
            "Could not find binary name '{attempted}' from core file : \
             Stack trace not produced for crash"
        ),
        binary: None,
        kind: ReportKind::BinaryNotFound,
    }
}
