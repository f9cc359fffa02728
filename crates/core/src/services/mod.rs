//! Seams to the external tools the pipeline depends on.
//!
//! The pipeline only talks to these traits; the process-spawning
//! implementations live in `backends` so tests can substitute fakes.

pub mod backends;

use std::path::Path;

use serde::Deserialize;

use crate::error::SymbolicateResult;
use crate::model::CommandScript;

/// The fields of a bundle descriptor (Info.plist) the resolver needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleDescriptor {
    #[serde(rename = "CFBundleIdentifier", default)]
    pub identifier: Option<String>,
    #[serde(rename = "CFBundleExecutable", default)]
    pub executable: Option<String>,
}

impl BundleDescriptor {
    pub fn new(identifier: impl Into<String>, executable: impl Into<String>) -> Self {
        Self { identifier: Some(identifier.into()), executable: Some(executable.into()) }
    }
}

/// Reads a bundle descriptor file.
pub trait DescriptorReader {
    fn read_descriptor(&self, path: &Path) -> SymbolicateResult<BundleDescriptor>;
}

/// Executes a command script and returns the output lines worth showing.
pub trait Debugger {
    fn execute(&self, script: &CommandScript) -> SymbolicateResult<Vec<String>>;
    fn name(&self) -> &'static str;
}
