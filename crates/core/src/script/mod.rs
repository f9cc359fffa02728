//! lldb command script generation.

use std::path::Path;

use log::warn;

use crate::kit::SymbolKitLayout;
use crate::model::{CommandScript, ModulePathTable, PanicReport};

/// Architecture the kernel target is created for.
pub const TARGET_ARCH: &str = "x86_64";

/// Module name lldb gives the kernel binary.
const KERNEL_MODULE: &str = "kernel";

/// Build the debugger commands for `report`.
///
/// Produces the target setup (3 commands), then an add/load pair per
/// extension in report order, then one lookup per backtrace address:
/// `3 + 2 * extensions + addresses` commands in total. Every extension is
/// expected to be present in `paths`; one that is not is added by its bundle
/// identifier.
pub fn build(
    report: &PanicReport,
    kit: &SymbolKitLayout,
    paths: &ModulePathTable,
) -> CommandScript {
    let mut script = CommandScript::new();

    script.push(format!("target create --arch {TARGET_ARCH} {}", quote_path(&kit.kernel_path)));
    script.push("settings set target.load-script-from-symbol-file true");
    let load_kernel =
        format!("target modules load --file {KERNEL_MODULE} --slide {}", report.kernel_slide);
    if report.kernel_slide.is_empty() {
        warn!("report has no kernel slide; lldb will reject `{load_kernel}`");
    }
    script.push(load_kernel);

    for ext in &report.extensions {
        let binary = paths.get(&ext.name).unwrap_or_else(|| Path::new(&ext.name));
        let module = binary.file_name().and_then(|n| n.to_str()).unwrap_or(&ext.name);
        script.push(format!("target modules add {}", quote_path(binary)));
        script.push(format!("target modules load --file {module} __TEXT {}", ext.load_address));
    }

    for address in &report.backtrace {
        script.push(format!("image lookup -a {address}"));
    }

    script
}

fn quote_path(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('"', "\\\""))
}
