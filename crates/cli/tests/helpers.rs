use std::path::Path;

use crashsift::{load_config, locate_executable, render_report};
use crashsift_core::model::{DebuggerKind, Report, ReportKind};
use tempfile::tempdir;

#[test]
fn render_report_underlines_summary_and_names_binary() {
    let report = Report {
        summary: "Segmentation fault in foo".into(),
        details: "Program terminated with signal 11, Segmentation fault.\n\
                  Stack trace from GDB :\nfoo (x=1)\nbar ()"
            .into(),
        binary: Some("/opt/app/server".into()),
        kind: ReportKind::Trace { debugger: DebuggerKind::Gdb },
    };
    let text = render_report(Path::new("/cores/core.42"), &report);
    assert_eq!(
        text,
        "Segmentation fault in foo\n\
         -------------------------\n\
         (Core file at /cores/core.42)\n\
         (Created by binary /opt/app/server)\n\
         Program terminated with signal 11, Segmentation fault.\n\
         Stack trace from GDB :\nfoo (x=1)\nbar ()\n"
    );
}

#[test]
fn render_report_omits_binary_line_when_unresolved() {
    let report = Report {
        summary: "Empty core file".into(),
        details: "Check your coredumpsize limit".into(),
        binary: None,
        kind: ReportKind::EmptyDump,
    };
    let text = render_report(Path::new("core"), &report);
    assert!(!text.contains("Created by binary"));
    assert!(text.starts_with("Empty core file\n---------------\n"));
}

#[test]
fn load_config_defaults_without_file() {
    let config = load_config(None).expect("config");
    assert_eq!(config.max_frames, 100);
}

#[test]
fn load_config_reports_bad_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("crashsift.json");
    std::fs::write(&path, "not-json").unwrap();
    let err = load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"), "unexpected error: {err}");
}

#[test]
fn locate_executable_checks_explicit_paths() {
    let temp = tempdir().unwrap();
    let tool = temp.path().join("gdb");
    std::fs::write(&tool, b"").unwrap();
    assert_eq!(locate_executable(&tool), Some(tool.clone()));
    assert_eq!(locate_executable(&temp.path().join("dbx")), None);
    assert_eq!(locate_executable(Path::new("crashsift-no-such-tool")), None);
}
