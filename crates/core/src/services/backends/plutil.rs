use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{SymbolicateError, SymbolicateResult};
use crate::services::{BundleDescriptor, DescriptorReader};

/// Descriptor reader that shells out to `plutil` to convert Info.plist to JSON.
#[derive(Debug, Clone)]
pub struct PlutilReader {
    plutil: PathBuf,
}

impl PlutilReader {
    pub fn new(plutil: impl Into<PathBuf>) -> Self {
        Self { plutil: plutil.into() }
    }

    pub fn plutil_path(&self) -> &Path {
        &self.plutil
    }
}

impl Default for PlutilReader {
    fn default() -> Self {
        Self::new("plutil")
    }
}

impl DescriptorReader for PlutilReader {
    fn read_descriptor(&self, path: &Path) -> SymbolicateResult<BundleDescriptor> {
        let output = Command::new(&self.plutil)
            .args(["-convert", "json", "-o", "-"])
            .arg(path)
            .output()
            .map_err(|e| descriptor_error(path, format!("failed to spawn plutil: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(descriptor_error(
                path,
                format!("plutil exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        parse_descriptor_json(path, &output.stdout)
    }
}

/// Decode the JSON form of an Info.plist. Unrelated keys are ignored.
pub fn parse_descriptor_json(path: &Path, body: &[u8]) -> SymbolicateResult<BundleDescriptor> {
    serde_json::from_slice(body)
        .map_err(|e| descriptor_error(path, format!("failed to parse plist JSON: {e}")))
}

fn descriptor_error(path: &Path, message: String) -> SymbolicateError {
    SymbolicateError::Descriptor { path: path.to_path_buf(), message }
}
