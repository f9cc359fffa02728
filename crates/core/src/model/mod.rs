//! Core data model for a symbolication run.
//!
//! Every value here is built once by one pipeline stage and only read by the
//! next:
//! - `PanicReport`: what the report parser extracted.
//! - `ModulePathTable`: where each kext binary lives on disk.
//! - `CommandScript`: the debugger commands to execute.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A kext listed in the report's "Kernel Extensions in backtrace" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRef {
    /// Bundle identifier, e.g. `com.apple.iokit.IOGraphicsFamily`.
    pub name: String,
    /// Load address of the kext's `__TEXT` segment, as printed (`0x` + 16 hex digits).
    pub load_address: String,
}

impl ExtensionRef {
    pub fn new(name: impl Into<String>, load_address: impl Into<String>) -> Self {
        Self { name: name.into(), load_address: load_address.into() }
    }
}

/// Typed view of a kernel panic report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicReport {
    /// OS build identifier, e.g. `15C50`.
    pub kernel_version: String,
    /// Kernel slide token, passed verbatim to the debugger. Empty when the
    /// report has no `Kernel slide:` line.
    pub kernel_slide: String,
    /// Kexts in report order; this is also the load order.
    pub extensions: Vec<ExtensionRef>,
    /// Return addresses, innermost frame first.
    pub backtrace: Vec<String>,
}

/// Mapping from kext bundle identifier to its resolved executable.
///
/// Built by the module resolver; every key it holds is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModulePathTable {
    paths: BTreeMap<String, PathBuf>,
}

impl ModulePathTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, path: PathBuf) {
        self.paths.insert(name.into(), path);
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

/// Ordered debugger commands, one per line when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandScript {
    commands: Vec<String>,
}

impl CommandScript {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for CommandScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }
        Ok(())
    }
}
