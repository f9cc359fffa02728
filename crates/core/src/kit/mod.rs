//! On-disk layout conventions for Kernel Debug Kits and kext bundles.
//!
//! Like the rest of the model these types only compute paths; they do not
//! touch the filesystem.

use std::path::{Path, PathBuf};

/// Logical layout of a Kernel Debug Kit (KDK) directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolKitLayout {
    /// Root of the kit, e.g. `/Library/Developer/KDKs/KDK_10.11.2_15C50.kdk`.
    pub root: PathBuf,
    /// Unstripped kernel binary.
    pub kernel_path: PathBuf,
    /// Directory holding the kit's kext bundles.
    pub extensions_dir: PathBuf,
}

impl SymbolKitLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let library = root.join("System").join("Library");
        let kernel_path = library.join("Kernels").join("kernel");
        let extensions_dir = library.join("Extensions");

        Self { root, kernel_path, extensions_dir }
    }
}

/// Logical layout of a single `.kext` bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub root: PathBuf,
    /// The bundle descriptor (`Contents/Info.plist`).
    pub descriptor_path: PathBuf,
    /// Directory holding the bundle's executable (`Contents/MacOS`).
    pub executable_dir: PathBuf,
    /// Nested plug-in bundles (`Contents/PlugIns`).
    pub plugins_dir: PathBuf,
}

impl BundleLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let contents = root.join("Contents");
        let descriptor_path = contents.join("Info.plist");
        let executable_dir = contents.join("MacOS");
        let plugins_dir = contents.join("PlugIns");

        Self { root, descriptor_path, executable_dir, plugins_dir }
    }

    /// Path of the executable named by the descriptor's `CFBundleExecutable`.
    pub fn executable_path(&self, executable: &str) -> PathBuf {
        self.executable_dir.join(executable)
    }
}
