use std::path::{Path, PathBuf};

use tracing::debug;

/// File marking a Sphinx configuration root.
pub const CONF_FILE: &str = "conf.py";

/// Find the directory holding `conf.py` by walking up from `source_file_dir`.
///
/// Returns `None` once the filesystem root has been checked without a match.
pub fn find_sphinx_confdir(source_file_dir: &Path) -> Option<PathBuf> {
    let start = std::path::absolute(source_file_dir).unwrap_or_else(|_| source_file_dir.to_path_buf());

    let found = start
        .ancestors()
        .find(|dir| dir.join(CONF_FILE).is_file())
        .map(Path::to_path_buf);

    match &found {
        Some(dir) => debug!("Found {} in {}", CONF_FILE, dir.display()),
        None => debug!(
            "No {} found in directory tree starting from {}",
            CONF_FILE,
            start.display()
        ),
    }
    found
}
