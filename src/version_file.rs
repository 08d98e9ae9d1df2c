use std::fs;
use std::path::Path;

use crate::error::Result;

/// Write `version` as the single line of the file at `path`.
///
/// The file is left untouched when it already holds exactly this content,
/// so its modification time only changes with the version.
///
/// # Returns
/// * `Ok(true)` - The file was created or rewritten
/// * `Ok(false)` - The file already contained the version
pub fn write_version_file(path: &Path, version: &str) -> Result<bool> {
    let content = format!("{}\n", version);
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            log::debug!("{} already contains {}", path.display(), version);
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    log::info!("Wrote version {} to {}", version, path.display());
    Ok(true)
}
