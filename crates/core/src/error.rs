use std::path::PathBuf;

use thiserror::Error;

/// Error type for every stage of a symbolication run.
///
/// All variants are fatal: the pipeline stops at the first one and the
/// frontend reports it as-is.
#[derive(Debug, Error)]
pub enum SymbolicateError {
    /// No panic report was found in the default report directory.
    #[error("No kernel panic reports found in {}", .0.display())]
    NoReportsFound(PathBuf),

    /// A required section is missing from the report text.
    #[error("Malformed panic report: {0}")]
    MalformedReport(String),

    /// No Kernel Debug Kit matches the report's kernel version.
    #[error("No Kernel Debug Kit found for kernel version {0}")]
    NoSymbolKitFound(String),

    /// A kext named in the backtrace has no matching bundle in any search root.
    #[error("Could not resolve kext {0}; pass its bundle location with -kext <path>")]
    UnresolvedModule(String),

    /// A bundle descriptor (Info.plist) could not be read or decoded.
    #[error("Failed to read bundle descriptor {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    /// A config file exists but is not valid JSON for `ToolConfig`.
    #[error("Invalid config file {}: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    /// The debugger could not be started or exited unsuccessfully.
    #[error("Debugger error: {0}")]
    Debugger(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SymbolicateError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedReport(reason.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Convenience result type for core operations.
pub type SymbolicateResult<T> = Result<T, SymbolicateError>;
