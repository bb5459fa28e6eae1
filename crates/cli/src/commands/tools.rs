use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crashsift_core::config::AnalyzerConfig;

use crate::locate_executable;

#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub configured: String,
    pub resolved: Option<String>,
    pub description: String,
}

/// Resolve every external tool the analyzer may launch.
pub fn collect_tools(config: &AnalyzerConfig) -> Vec<ToolInfo> {
    let tools = &config.tools;
    let entries: [(&str, &Path, &str); 6] = [
        ("gdb", tools.gdb.as_path(), "Primary debugger"),
        ("dbx", tools.dbx.as_path(), "Fallback debugger when gdb output cannot be parsed"),
        ("file", tools.file.as_path(), "Reads the program name recorded in the core file"),
        ("strings", tools.strings.as_path(), "Lists embedded paths (in-process scan if missing)"),
        ("uncompress", tools.uncompress.as_path(), "Expands .Z core files"),
        ("compress", tools.compress.as_path(), "Recompresses .Z core files after analysis"),
    ];
    entries
        .into_iter()
        .map(|(name, path, description)| ToolInfo {
            name: name.to_string(),
            configured: path.display().to_string(),
            resolved: locate_executable(path).map(|p| p.display().to_string()),
            description: description.to_string(),
        })
        .collect()
}

/// List the external tools and whether each can be found.
pub fn list_tools_command(config: &AnalyzerConfig, json: bool) -> Result<()> {
    let tools = collect_tools(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Tools:");
    for tool in tools {
        match tool.resolved {
            Some(path) => println!("- {}: OK ({}) - {}", tool.name, path, tool.description),
            None => {
                println!("- {}: MISSING ({}) - {}", tool.name, tool.configured, tool.description)
            }
        }
    }

    Ok(())
}
