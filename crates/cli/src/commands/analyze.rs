use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use crashsift_core::config::AnalyzerConfig;
use crashsift_core::model::Report;
use crashsift_core::services::analyze_core;

use crate::compression::UncompressedDump;
use crate::render_report;

/// Machine-readable form of a report, tagged with the dump it describes.
#[derive(Debug, Serialize)]
pub struct ReportOutput<'a> {
    pub core_file: String,
    #[serde(flatten)]
    pub report: &'a Report,
}

/// Analyze one core dump and print its report.
///
/// `.Z` dumps are uncompressed for the duration of the analysis.
pub fn analyze_command(core: &str, config: &AnalyzerConfig, json: bool) -> Result<()> {
    let core_path = Path::new(core);
    if !core_path.is_file() {
        return Err(anyhow!("File not found : {core}"));
    }

    let uncompressed =
        UncompressedDump::prepare(core_path, &config.tools.uncompress, &config.tools.compress)
            .with_context(|| format!("Failed to uncompress {core}"))?;
    let dump = uncompressed.as_ref().map(|u| u.path()).unwrap_or(core_path);

    let report = analyze_core(dump, config)
        .with_context(|| format!("Failed to analyze core file {}", dump.display()))?;

    if json {
        let output = ReportOutput { core_file: dump.display().to_string(), report: &report };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(dump, &report));
    }

    Ok(())
}
