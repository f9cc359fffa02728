//! Default-path lookups used when the caller does not name a report or kit.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, info};

use crate::error::{SymbolicateError, SymbolicateResult};

/// `Kernel*` is the classic text report; macOS 11 and later write
/// `panic-full-*` JSON envelopes.
const REPORT_PREFIXES: [&str; 2] = ["Kernel", "panic-full"];
const REPORT_SUFFIX: &str = ".panic";

/// Newest `Kernel*.panic` or `panic-full*.panic` file in `dir`, by
/// modification time.
pub fn newest_report(dir: &Path) -> SymbolicateResult<PathBuf> {
    let entries =
        fs::read_dir(dir).map_err(|_| SymbolicateError::NoReportsFound(dir.to_path_buf()))?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_report_name(&name) {
            continue;
        }
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if newest.as_ref().map_or(true, |(best, _)| modified > *best) {
            newest = Some((modified, entry.path()));
        }
    }

    let (_, path) = newest.ok_or_else(|| SymbolicateError::NoReportsFound(dir.to_path_buf()))?;
    info!("newest panic report: {}", path.display());
    Ok(path)
}

fn is_report_name(name: &str) -> bool {
    name.ends_with(REPORT_SUFFIX) && REPORT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// First entry of `dir` (by name) whose name contains `kernel_version`.
pub fn find_symbol_kit(dir: &Path, kernel_version: &str) -> SymbolicateResult<PathBuf> {
    let not_found = || SymbolicateError::NoSymbolKitFound(kernel_version.to_string());
    let entries = fs::read_dir(dir).map_err(|err| {
        debug!("cannot list {}: {err}", dir.display());
        not_found()
    })?;

    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().contains(kernel_version))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    matches.sort();

    let kit = matches.into_iter().next().ok_or_else(not_found)?;
    info!("symbol kit for {kernel_version}: {}", kit.display());
    Ok(kit)
}
