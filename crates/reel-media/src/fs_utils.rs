//! Output file naming and directory setup.
//!
//! Outputs are named `<stem>_out.<ext>` next to each other in one output
//! directory. Existing files are never overwritten: a numeric suffix
//! (`_out_1`, `_out_2`, ...) is appended until a free name is found.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Marker between the source stem and the collision counter.
pub const OUTPUT_SUFFIX: &str = "_out";

fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

/// Candidate output name for a source and collision counter.
///
/// Counter `0` is the plain `<stem>_out.<ext>` name.
pub fn output_file_name(source: &Path, extension: &str, counter: u32) -> String {
    let stem = source_stem(source);
    if counter == 0 {
        format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension)
    } else {
        format!("{}{}_{}.{}", stem, OUTPUT_SUFFIX, counter, extension)
    }
}

/// First output path in `dir` that neither exists on disk nor is in
/// `reserved`.
pub fn resolve_output_path(
    dir: &Path,
    source: &Path,
    extension: &str,
    reserved: &HashSet<PathBuf>,
) -> PathBuf {
    let mut counter = 0;
    loop {
        let candidate = dir.join(output_file_name(source, extension, counter));
        if !candidate.exists() && !reserved.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Create the output directory tree.
///
/// # Errors
///
/// Returns an error if the path exists and is not a directory, or if it
/// cannot be created.
pub async fn ensure_output_dir(dir: impl AsRef<Path>) -> MediaResult<()> {
    let dir = dir.as_ref();

    if dir.exists() && !dir.is_dir() {
        return Err(MediaError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", dir.display()),
        )));
    }

    fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        );
        MediaError::from(e)
    })
}

/// Create the parent directory of an output file, if it has one.
pub async fn ensure_parent_dir(output: impl AsRef<Path>) -> MediaResult<()> {
    match output.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_output_dir(parent).await,
        _ => Ok(()),
    }
}
