//! Kext name to binary path resolution.
//!
//! Search roots are scanned in order. A root is either a bundle itself or a
//! directory of `.kext` bundles; every bundle is followed by the bundles in
//! its `Contents/PlugIns`. The first bundle whose descriptor declares the
//! wanted identifier and whose executable exists wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{SymbolicateError, SymbolicateResult};
use crate::kit::BundleLayout;
use crate::model::{ExtensionRef, ModulePathTable};
use crate::services::{BundleDescriptor, DescriptorReader};

const BUNDLE_EXTENSION: &str = "kext";

pub struct ModuleResolver<'a> {
    reader: &'a dyn DescriptorReader,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(reader: &'a dyn DescriptorReader) -> Self {
        Self { reader }
    }

    /// Resolve every distinct extension name against `roots`.
    ///
    /// Stops at the first name without a match and reports it as
    /// `UnresolvedModule`.
    pub fn resolve(
        &self,
        extensions: &[ExtensionRef],
        roots: &[PathBuf],
    ) -> SymbolicateResult<ModulePathTable> {
        self.resolve_with_progress(extensions, roots, |_, _| {})
    }

    /// Same as `resolve`, calling `on_resolved` after each successful match.
    pub fn resolve_with_progress<F>(
        &self,
        extensions: &[ExtensionRef],
        roots: &[PathBuf],
        mut on_resolved: F,
    ) -> SymbolicateResult<ModulePathTable>
    where
        F: FnMut(&str, &Path),
    {
        let candidates = candidate_bundles(roots);
        debug!("{} candidate bundles under {} search roots", candidates.len(), roots.len());

        let mut descriptors: HashMap<PathBuf, Option<BundleDescriptor>> = HashMap::new();
        let mut table = ModulePathTable::new();

        for ext in extensions {
            if table.contains(&ext.name) {
                continue;
            }
            let path = candidates
                .iter()
                .find_map(|bundle| self.match_bundle(bundle, &ext.name, &mut descriptors))
                .ok_or_else(|| SymbolicateError::UnresolvedModule(ext.name.clone()))?;

            on_resolved(&ext.name, &path);
            table.insert(ext.name.clone(), path);
        }

        Ok(table)
    }

    /// Executable path of `bundle` if it provides `name`.
    fn match_bundle(
        &self,
        bundle: &BundleLayout,
        name: &str,
        descriptors: &mut HashMap<PathBuf, Option<BundleDescriptor>>,
    ) -> Option<PathBuf> {
        let descriptor = descriptors
            .entry(bundle.descriptor_path.clone())
            .or_insert_with(|| self.load_descriptor(bundle))
            .as_ref()?;

        if descriptor.identifier.as_deref() != Some(name) {
            return None;
        }
        let executable = bundle.executable_path(descriptor.executable.as_deref()?);
        if !executable.is_file() {
            debug!(
                "{} declares {name} but {} is missing",
                bundle.root.display(),
                executable.display()
            );
            return None;
        }
        Some(fs::canonicalize(&executable).unwrap_or(executable))
    }

    fn load_descriptor(&self, bundle: &BundleLayout) -> Option<BundleDescriptor> {
        if !bundle.descriptor_path.is_file() {
            return None;
        }
        match self.reader.read_descriptor(&bundle.descriptor_path) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                debug!("skipping {}: {err}", bundle.root.display());
                None
            }
        }
    }
}

/// Expand search roots into the ordered list of bundles to inspect.
pub fn candidate_bundles(roots: &[PathBuf]) -> Vec<BundleLayout> {
    let mut bundles = Vec::new();
    for root in roots {
        let root_bundle = BundleLayout::new(root);
        if root_bundle.descriptor_path.is_file() {
            push_with_plugins(root_bundle, &mut bundles);
        } else {
            for child in bundle_children(root) {
                push_with_plugins(BundleLayout::new(child), &mut bundles);
            }
        }
    }
    bundles
}

fn push_with_plugins(bundle: BundleLayout, out: &mut Vec<BundleLayout>) {
    let plugins = bundle_children(&bundle.plugins_dir);
    out.push(bundle);
    out.extend(plugins.into_iter().map(BundleLayout::new));
}

/// `.kext` directories directly under `dir`, sorted by name.
fn bundle_children(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_dir() && path.extension().and_then(|e| e.to_str()) == Some(BUNDLE_EXTENSION)
        })
        .collect();
    children.sort();
    children
}
