use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use kpanic_core::config::ToolConfig;
use kpanic_core::pipeline::Progress;

use crate::absolute_path;

/// Build the tool config: defaults, then the optional JSON file, then environment.
pub fn load_tool_config(config_path: Option<&str>) -> Result<ToolConfig> {
    let base = match config_path {
        Some(path) => {
            let path = absolute_path(path)?;
            ToolConfig::from_file(&path)
                .with_context(|| format!("Failed to load config at {}", path.display()))?
        }
        None => ToolConfig::default(),
    };
    Ok(base.with_env_overrides())
}

/// Local modification time of `path`, if the filesystem reports one.
pub fn modified_label(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    let local: DateTime<Local> = modified.into();
    Some(local.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Console line for a pipeline milestone.
pub fn progress_line(event: Progress<'_>) -> String {
    match event {
        Progress::ReportSelected(path) => match modified_label(path) {
            Some(when) => format!("  Report: {} (modified {when})", path.display()),
            None => format!("  Report: {}", path.display()),
        },
        Progress::SymbolKitSelected(path) => format!("  KDK:    {}", path.display()),
        Progress::ModuleResolved { name, path } => {
            format!("  Kext:   {name} -> {}", path.display())
        }
    }
}
