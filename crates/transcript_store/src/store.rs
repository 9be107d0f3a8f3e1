use std::fs;
use std::path::PathBuf;

use crate::error::TranscriptStoreError;
use crate::paths::transcript_path;

/// Joins transcript lines the way they are written to disk.
#[must_use]
pub fn render_transcript(lines: &[String]) -> String {
    lines.join("\n")
}

/// Writes `lines` to the `.txt` file derived from `destination`, replacing any
/// existing file, and returns its absolute path.
pub fn save_transcript(
    lines: &[String],
    destination: &str,
) -> Result<PathBuf, TranscriptStoreError> {
    let destination = destination.trim();
    if destination.is_empty() {
        return Err(TranscriptStoreError::EmptyDestination);
    }

    let path = transcript_path(destination);
    fs::write(&path, render_transcript(lines))
        .map_err(|source| TranscriptStoreError::io("writing transcript", &path, source))?;

    let resolved = fs::canonicalize(&path)
        .map_err(|source| TranscriptStoreError::io("resolving transcript path", &path, source))?;
    tracing::info!(path = %resolved.display(), lines = lines.len(), "transcript saved");

    Ok(resolved)
}
