use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SymbolicateError, SymbolicateResult};

pub const REPORTS_DIR_ENV: &str = "KPANIC_REPORTS_DIR";
pub const KDK_DIR_ENV: &str = "KPANIC_KDK_DIR";
pub const LLDB_ENV: &str = "LLDB_BIN";
pub const PLUTIL_ENV: &str = "PLUTIL_BIN";

/// Locations of default inputs and external tools.
///
/// Defaults match a stock macOS install. A JSON file may override any
/// subset of fields, and environment variables override the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Where the system writes kernel panic reports.
    pub reports_dir: PathBuf,
    /// Where Kernel Debug Kits are installed.
    pub kdk_dir: PathBuf,
    pub lldb: PathBuf,
    pub plutil: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("/Library/Logs/DiagnosticReports"),
            kdk_dir: PathBuf::from("/Library/Developer/KDKs"),
            lldb: PathBuf::from("lldb"),
            plutil: PathBuf::from("plutil"),
        }
    }
}

impl ToolConfig {
    /// Load a config file; fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> SymbolicateResult<Self> {
        let body = fs::read_to_string(path).map_err(|e| SymbolicateError::io(path, e))?;
        serde_json::from_str(&body).map_err(|e| SymbolicateError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var_os(key))
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(dir) = non_empty(REPORTS_DIR_ENV) {
            self.reports_dir = dir;
        }
        if let Some(dir) = non_empty(KDK_DIR_ENV) {
            self.kdk_dir = dir;
        }
        if let Some(bin) = non_empty(LLDB_ENV) {
            self.lldb = bin;
        }
        if let Some(bin) = non_empty(PLUTIL_ENV) {
            self.plutil = bin;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_set_variables() {
        let config = ToolConfig::default().with_overrides(|key| match key {
            LLDB_ENV => Some(OsString::from("/opt/llvm/bin/lldb")),
            KDK_DIR_ENV => Some(OsString::new()),
            _ => None,
        });
        assert_eq!(config.lldb, PathBuf::from("/opt/llvm/bin/lldb"));
        assert_eq!(config.kdk_dir, ToolConfig::default().kdk_dir);
        assert_eq!(config.plutil, PathBuf::from("plutil"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpanic.json");
        fs::write(&path, r#"{"kdk_dir":"/Volumes/KDKs"}"#).unwrap();

        let config = ToolConfig::from_file(&path).unwrap();
        assert_eq!(config.kdk_dir, PathBuf::from("/Volumes/KDKs"));
        assert_eq!(config.reports_dir, ToolConfig::default().reports_dir);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpanic.json");
        fs::write(&path, "not-json").unwrap();
        assert!(ToolConfig::from_file(&path).is_err());
    }
}
