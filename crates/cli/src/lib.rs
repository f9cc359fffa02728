pub mod commands;

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Single-dash flag spellings accepted for compatibility, and the clap long
/// flag each one maps to.
const LEGACY_FLAGS: &[(&str, &str)] =
    &[("-report", "--report"), ("-kdk", "--kdk"), ("-kext", "--kext"), ("-?", "--help")];

/// Rewrite single-dash flags (`-report`, `-kdk`, `-kext`, `-?`) to the
/// double-dash forms clap understands. Everything after `--` is left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg.to_str() == Some("--") {
                passthrough = true;
                return arg;
            }
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| arg.to_str() == Some(*legacy))
                .map(|(_, long)| OsString::from(long))
                .unwrap_or(arg)
        })
        .collect()
}

/// Make a user-supplied path absolute, canonicalizing it when it exists.
pub fn absolute_path(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}
