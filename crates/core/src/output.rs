//! Run artifacts on disk.
//!
//! Each run of the scraper or the solver writes into its own timestamped
//! directory under a runs directory, e.g. `runs/watchtower/2024-06-01T10-00-00Z/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::{Result, WolError};

/// Creates the runs directory (and its parents) when missing.
pub fn create_runs_dir(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!(path = %path.display(), "runs directory created");
    }
    Ok(path.to_path_buf())
}

/// Creates a directory named after the current UTC time inside `runs_dir`.
pub fn create_run_dir(runs_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let now = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap_or_else(|_| OffsetDateTime::now_utc());
    let stamp = now
        .format(&Rfc3339)
        .map_err(|e| WolError::ConfigError(format!("cannot format run timestamp: {}", e)))?;

    let dir = runs_dir.as_ref().join(sanitize_filename(&stamp.replace(':', "-")));
    fs::create_dir_all(&dir)?;
    info!(path = %dir.display(), "run directory created");
    Ok(dir)
}

/// Writes `contents` to `dir/name` and returns the written path.
pub fn write_text(dir: impl AsRef<Path>, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(sanitize_filename(name));
    fs::write(&path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(path)
}

/// Writes `value` as pretty JSON to `dir/name` and returns the written path.
pub fn write_json<T: Serialize + ?Sized>(dir: impl AsRef<Path>, name: &str, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(dir, name, &json)
}

/// Replaces characters that are invalid in file names on common platforms.
///
/// ```rust
/// use wolstudy_core::output::sanitize_filename;
///
/// assert_eq!(sanitize_filename("w24.12: ¿Amor?"), "w24.12_ ¿Amor_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let options = ::sanitize_filename::Options { windows: true, truncate: true, replacement: "_" };
    let cleaned = ::sanitize_filename::sanitize_with_options(name.trim(), options);
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}

/// File name for a scraped record: `"<number> — <title>.json"`, each part
/// sanitized on its own.
///
/// ```rust
/// use wolstudy_core::output::record_file_name;
///
/// assert_eq!(
///     record_file_name("ARTÍCULO DE ESTUDIO 12", "¿Amamos?"),
///     "ARTÍCULO DE ESTUDIO 12 — ¿Amamos_.json"
/// );
/// ```
pub fn record_file_name(number: &str, title: &str) -> String {
    format!("{} — {}.json", sanitize_filename(number), sanitize_filename(title))
}
