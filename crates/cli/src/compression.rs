use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};

/// A `.Z` dump that was uncompressed for analysis and is recompressed on drop.
#[derive(Debug)]
pub struct UncompressedDump {
    plain: PathBuf,
    compress_tool: PathBuf,
}

impl UncompressedDump {
    /// Uncompress `path` in place if it carries the `.Z` suffix.
    ///
    /// Returns `None` for uncompressed dumps.
    pub fn prepare(
        path: &Path,
        uncompress_tool: &Path,
        compress_tool: &Path,
    ) -> Result<Option<Self>> {
        let Some(plain) = strip_z_suffix(path) else {
            return Ok(None);
        };
        run_tool(uncompress_tool, path)?;
        tracing::debug!(plain = %plain.display(), "uncompressed core file");
        Ok(Some(Self { plain, compress_tool: compress_tool.to_path_buf() }))
    }

    pub fn path(&self) -> &Path {
        &self.plain
    }
}

impl Drop for UncompressedDump {
    fn drop(&mut self) {
        if let Err(e) = run_tool(&self.compress_tool, &self.plain) {
            tracing::warn!(error = %e, "failed to recompress core file");
        }
    }
}

/// `core.Z` -> `core`; `None` when the name does not end in `.Z`.
pub fn strip_z_suffix(path: &Path) -> Option<PathBuf> {
    let name = path.to_str()?;
    let stem = name.strip_suffix(".Z")?;
    if stem.is_empty() {
        return None;
    }
    Some(PathBuf::from(stem))
}

fn run_tool(tool: &Path, target: &Path) -> Result<()> {
    let status = Command::new(tool)
        .arg(target)
        .status()
        .with_context(|| format!("Failed to run {}", tool.display()))?;
    if !status.success() {
        return Err(anyhow!("{} {} exited with {}", tool.display(), target.display(), status));
    }
    Ok(())
}
