pub mod commands;
pub mod compression;
pub mod logging;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crashsift_core::config::AnalyzerConfig;
use crashsift_core::model::Report;

/// Load the analyzer config from `path` (JSON or YAML), or defaults when absent,
/// then apply `CRASHSIFT_GDB` / `CRASHSIFT_DBX` from the environment.
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    let config = match path {
        Some(p) => AnalyzerConfig::load(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => AnalyzerConfig::default(),
    };
    Ok(config.with_env_overrides())
}

/// Render a report the way it is shown on the terminal.
///
/// The summary is underlined with one dash per character, followed by the dump
/// location, the binary (when one was resolved) and the detail block.
pub fn render_report(core_file: &Path, report: &Report) -> String {
    let mut out = format!(
        "{}\n{}\n(Core file at {})\n",
        report.summary,
        "-".repeat(report.summary.chars().count()),
        core_file.display()
    );
    if let Some(binary) = &report.binary {
        out.push_str(&format!("(Created by binary {binary})\n"));
    }
    out.push_str(&report.details);
    out.push('\n');
    out
}

/// Locate an executable: explicit paths must exist, bare names are searched on `PATH`.
pub fn locate_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths).find_map(|dir| {
            let candidate = dir.join(program);
            if candidate.is_file() {
                Some(candidate)
            } else {
                None
            }
        })
    })
}
