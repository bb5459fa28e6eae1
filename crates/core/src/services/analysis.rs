use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AnalyzerConfig;
use crate::model::{CoreDump, DebuggerKind, Report, ResolvedBinary};
use crate::services::classify::{Attempt, FailureClassifier};
use crate::services::invoker::{DebuggerInvoker, InvokeError, SessionSource};
use crate::services::parser::parser_for;
use crate::services::report::{binary_not_found_report, empty_dump_report, ReportAssembler};
use crate::services::resolver::{BinaryLocator, BinaryResolver};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read core file {}: {source}", path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Debugger(#[from] InvokeError),
}

/// Drives one dump through resolution, the primary debugger and, if that fails to
/// parse, the fallback debugger.
pub struct CoreAnalyzer<'a> {
    pub locator: &'a dyn BinaryLocator,
    pub sessions: &'a dyn SessionSource,
    pub classifier: FailureClassifier,
    pub assembler: ReportAssembler,
}

impl<'a> CoreAnalyzer<'a> {
    pub fn new(
        locator: &'a dyn BinaryLocator,
        sessions: &'a dyn SessionSource,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            locator,
            sessions,
            classifier: FailureClassifier::new(config.max_error_chars),
            assembler: ReportAssembler::new(config.max_frames),
        }
    }

    /// Analyze a dump. Every outcome short of a missing primary debugger yields a report.
    pub fn analyze(&self, dump_path: &Path) -> Result<Report, AnalysisError> {
        let dump = CoreDump::open(dump_path)
            .map_err(|source| AnalysisError::Dump { path: dump_path.to_path_buf(), source })?;
        if dump.is_empty() {
            tracing::info!(dump = %dump.path.display(), "empty core file");
            return Ok(empty_dump_report());
        }

        let binary = self.locator.resolve(&dump.path);
        if !binary.exists {
            tracing::info!(attempted = %binary.display_name(), "no binary found for core");
            return Ok(binary_not_found_report(&binary.display_name()));
        }

        let report = self.run_debuggers(&dump, &binary)?;
        tracing::info!(outcome = ?report.kind, summary = %report.summary, "core analysed");
        Ok(report.with_binary(Some(binary.display_name())))
    }

    fn run_debuggers(
        &self,
        dump: &CoreDump,
        binary: &ResolvedBinary,
    ) -> Result<Report, AnalysisError> {
        let primary = DebuggerKind::Gdb;
        let first = match self.attempt(primary, dump, binary)? {
            Attempt::Success(report) => return Ok(report),
            Attempt::ParseFailure(report) => report,
        };
        let Some(secondary) = primary.fallback() else {
            return Ok(first);
        };

        match self.attempt(secondary, dump, binary) {
            Ok(Attempt::Success(report)) => Ok(report),
            Ok(Attempt::ParseFailure(second)) => Ok(FailureClassifier::combine(&first, &second)),
            Err(e) if e.is_unavailable() => {
                tracing::debug!(
                    error = %e,
                    "fallback debugger not installed, keeping primary failure"
                );
                Ok(first)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn attempt(
        &self,
        kind: DebuggerKind,
        dump: &CoreDump,
        binary: &ResolvedBinary,
    ) -> Result<Attempt, InvokeError> {
        let session = self.sessions.invoke(kind, &dump.path, binary.as_path())?;
        let trace = parser_for(kind).parse(&session.stdout);
        tracing::debug!(
            %kind,
            frames = trace.frames.len(),
            exit_code = ?session.exit_code,
            "parsed debugger output"
        );
        Ok(self.classifier.classify(&trace, &session, kind, &self.assembler))
    }
}

/// Analyze a dump with the real `file`/`strings` resolver and debugger processes.
pub fn analyze_core(dump: &Path, config: &AnalyzerConfig) -> Result<Report, AnalysisError> {
    let resolver = BinaryResolver::from_config(config);
    let invoker = DebuggerInvoker::new(config.tools.clone(), config.timeout());
    CoreAnalyzer::new(&resolver, &invoker, config).analyze(dump)
}

