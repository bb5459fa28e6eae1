use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DebuggerKind;

/// Default watchdog applied to each debugger invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
/// Frames printed before the trace is cut off.
pub const DEFAULT_MAX_FRAMES: usize = 100;
/// Error text longer than this is assumed to be binary garbage.
pub const DEFAULT_MAX_ERROR_CHARS: usize = 50_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse config YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Unsupported config format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Paths of the external tools the pipeline shells out to.
///
/// Bare names are looked up on `PATH` when the process is spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub gdb: PathBuf,
    pub dbx: PathBuf,
    pub file: PathBuf,
    pub strings: PathBuf,
    pub uncompress: PathBuf,
    pub compress: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            gdb: PathBuf::from("gdb"),
            dbx: PathBuf::from("dbx"),
            file: PathBuf::from("file"),
            strings: PathBuf::from("strings"),
            uncompress: PathBuf::from("uncompress"),
            compress: PathBuf::from("compress"),
        }
    }
}

impl ToolPaths {
    pub fn debugger(&self, kind: DebuggerKind) -> &Path {
        match kind {
            DebuggerKind::Gdb => &self.gdb,
            DebuggerKind::Dbx => &self.dbx,
        }
    }
}

/// Settings for one analyzer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub tools: ToolPaths,
    /// Watchdog per debugger invocation; `None` or zero waits forever.
    pub timeout_secs: Option<u64>,
    pub max_frames: usize,
    pub max_error_chars: usize,
    /// Overrides `$USER` for the temporary-binary naming heuristic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            max_frames: DEFAULT_MAX_FRAMES,
            max_error_chars: DEFAULT_MAX_ERROR_CHARS,
            user: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load a config file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "json" => serde_json::from_str(&body)
                .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source }),
            "yaml" | "yml" => serde_yaml::from_str(&body)
                .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source }),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Apply `CRASHSIFT_GDB` / `CRASHSIFT_DBX` overrides from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(gdb) = env::var_os("CRASHSIFT_GDB") {
            self.tools.gdb = PathBuf::from(gdb);
        }
        if let Some(dbx) = env::var_os("CRASHSIFT_DBX") {
            self.tools.dbx = PathBuf::from(dbx);
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }

    /// The user identity used to undo temporary binary renames.
    pub fn effective_user(&self) -> Option<String> {
        self.user.clone().or_else(|| env::var("USER").ok()).filter(|u| !u.is_empty())
    }
}
