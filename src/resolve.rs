//! Filesystem resolution for partials.
//!
//! When a partial is not pre-registered with the host, the composer can
//! fall back to configured template directories: the logical name is turned
//! into a relative path and each directory is probed in order, first match
//! winning.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ComposeError, Result};

/// Maps a logical partial name to its relative file path.
///
/// `"sidebar"` with suffix `"html"` becomes `sidebar.html`; a name ending
/// in a path separator is treated as a directory and resolves to its index
/// file, so `"widgets/"` becomes `widgets/index.html`.
pub fn partial_path(name: &str, suffix: &str) -> PathBuf {
    if name.ends_with('/') {
        Path::new(name.trim_end_matches('/')).join(format!("index.{suffix}"))
    } else {
        PathBuf::from(format!("{name}.{suffix}"))
    }
}

/// Probes `dirs` in order for the partial named `name` and reads the first
/// existing file.
///
/// Returns `Ok(None)` when no candidate exists in any directory; the caller
/// decides whether that is a missing-partial error.
///
/// # Errors
///
/// Returns [`ComposeError::PartialRead`] if a candidate file exists but
/// cannot be read.
pub fn probe_dirs(dirs: &[PathBuf], name: &str, suffix: &str) -> Result<Option<(PathBuf, String)>> {
    let relative = partial_path(name, suffix);

    for dir in dirs {
        let candidate = dir.join(&relative);
        if candidate.is_file() {
            let source =
                fs::read_to_string(&candidate).map_err(|err| ComposeError::PartialRead {
                    path: candidate.clone(),
                    message: err.to_string(),
                })?;
            return Ok(Some((candidate, source)));
        }
    }

    Ok(None)
}
