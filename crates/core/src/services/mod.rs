pub mod analysis;
pub mod classify;
pub mod invoker;
pub mod parser;
pub mod report;
pub mod resolver;

pub use analysis::{analyze_core, AnalysisError, CoreAnalyzer};
pub use classify::{Attempt, FailureClassifier};
pub use invoker::{DebuggerInvoker, InvokeError, SessionSource};
pub use parser::{parser_for, DbxParser, GdbParser, TraceParser};
pub use report::ReportAssembler;
pub use resolver::{BinaryLocator, BinaryResolver};
