//! Line-oriented grammars for gdb and dbx backtrace output.
//!
//! Both parsers make a single pass over the captured text. The only look-back is a
//! comparison with the immediately preceding line, used to drop consecutive
//! duplicates. A missing termination line leaves `summary_line` empty, which the
//! caller classifies as a parse failure.

use crate::model::{DebuggerKind, ParsedTrace};

/// Shared interface for the per-debugger output grammars.
pub trait TraceParser: Send + Sync {
    fn kind(&self) -> DebuggerKind;
    fn parse(&self, output: &str) -> ParsedTrace;
}

/// Select the grammar for a debugger.
pub fn parser_for(kind: DebuggerKind) -> &'static dyn TraceParser {
    match kind {
        DebuggerKind::Gdb => &GdbParser,
        DebuggerKind::Dbx => &DbxParser,
    }
}

/// Grammar for `gdb -batch` output (`Program terminated ...` plus `#N` frames).
pub struct GdbParser;

impl TraceParser for GdbParser {
    fn kind(&self) -> DebuggerKind {
        DebuggerKind::Gdb
    }

    fn parse(&self, output: &str) -> ParsedTrace {
        let mut trace = ParsedTrace::default();
        let mut prev_line = "";
        let mut stack_started = false;

        for line in output.lines() {
            if line.contains("Program terminated") {
                trace.summary_line = line.trim().to_string();
                trace.signal_description = gdb_signal(&trace.summary_line);
            }
            if line.starts_with('#') {
                stack_started = true;
            }
            if stack_started && line != prev_line {
                let frame = line.trim_end();
                let frame = match frame.find("in ") {
                    Some(pos) => &frame[pos + 3..],
                    None => frame.trim(),
                };
                trace.frames.push(frame.to_string());
            }
            prev_line = line;
        }

        if trace.frames.len() > 1 {
            let method = gdb_method_name(&trace.frames[0]);
            trace.signal_description.push_str(" in ");
            trace.signal_description.push_str(&method);
        }
        trace
    }
}

/// Text after the last comma, minus a trailing period.
fn gdb_signal(summary_line: &str) -> String {
    let tail = summary_line.rsplit(',').next().unwrap_or_default().trim();
    tail.strip_suffix('.').unwrap_or(tail).to_string()
}

/// Function name from a gdb frame: drop the argument list and any `+0x..` offset.
pub(crate) fn gdb_method_name(frame: &str) -> String {
    let name = match frame.rfind('(') {
        Some(end) => &frame[..end],
        None => frame,
    };
    let name = match name.find("+0") {
        Some(offset) => &name[..offset],
        None => name,
    };
    name.trim().to_string()
}

/// Grammar for `dbx -c "where; quit"` output (`program terminated ...` plus `[N]` frames).
pub struct DbxParser;

impl TraceParser for DbxParser {
    fn kind(&self) -> DebuggerKind {
        DebuggerKind::Dbx
    }

    fn parse(&self, output: &str) -> ParsedTrace {
        let mut trace = ParsedTrace::default();
        let mut prev_line = "";

        for line in output.lines() {
            let stripped = line.trim();
            if line.contains("program terminated") {
                trace.summary_line = stripped.to_string();
                trace.signal_description = dbx_signal(&trace.summary_line);
            }
            if (stripped.starts_with('[') || stripped.starts_with("=>[")) && line != prev_line {
                match dbx_frame(line) {
                    Some(frame) => trace.frames.push(frame.to_string()),
                    None => tracing::debug!(line, "skipping dbx frame with unexpected layout"),
                }
            }
            prev_line = line;
        }

        if trace.frames.len() > 1 {
            trace.signal_description.push_str(" in ");
            trace.signal_description.push_str(trace.frames[0].trim());
        }
        trace
    }
}

/// Text inside the last parenthesised group of the termination line.
fn dbx_signal(summary_line: &str) -> String {
    summary_line.rsplit('(').next().unwrap_or_default().replace(')', "")
}

/// Frame text from two characters past the first `]` up to the last `(`.
fn dbx_frame(line: &str) -> Option<&str> {
    let start = line.find(']')? + 2;
    let end = line.rfind('(')?;
    if end < start {
        return None;
    }
    line.get(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdb_method_name_strips_args_and_offset() {
        assert_eq!(gdb_method_name("foo (x=1)"), "foo");
        assert_eq!(gdb_method_name("Widget::draw+0x1c (this=0x0)"), "Widget::draw");
        assert_eq!(gdb_method_name("  raise  "), "raise");
    }

    #[test]
    fn gdb_signal_strips_only_trailing_period() {
        assert_eq!(
            gdb_signal("Program terminated with signal 11, Segmentation fault."),
            "Segmentation fault"
        );
        assert_eq!(gdb_signal("Program terminated with signal SIGABRT, Aborted"), "Aborted");
    }

    #[test]
    fn dbx_frame_requires_bracket_and_paren_layout() {
        assert_eq!(dbx_frame("  [2] bar(), line 5 in \"a.c\""), Some("bar"));
        assert_eq!(dbx_frame("=>[1] foo(x = 1), line 10"), Some("foo"));
        assert_eq!(dbx_frame("[1]("), None);
        assert_eq!(dbx_frame("[no closing bracket"), None);
    }

    #[test]
    fn parser_for_selects_matching_grammar() {
        assert_eq!(parser_for(DebuggerKind::Gdb).kind(), DebuggerKind::Gdb);
        assert_eq!(parser_for(DebuggerKind::Dbx).kind(), DebuggerKind::Dbx);
    }
}
