//! End-to-end symbolication: report -> modules -> script -> debugger output.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::ToolConfig;
use crate::error::SymbolicateResult;
use crate::kit::SymbolKitLayout;
use crate::locate::{find_symbol_kit, newest_report};
use crate::model::{CommandScript, ModulePathTable, PanicReport};
use crate::report::parse_report_file;
use crate::resolver::ModuleResolver;
use crate::script;
use crate::services::{Debugger, DescriptorReader};

/// Inputs to one run. `None` means "use the default location from `config`".
#[derive(Debug, Clone, Default)]
pub struct SymbolicateRequest {
    pub report: Option<PathBuf>,
    pub symbol_kit: Option<PathBuf>,
    /// Extra kext search roots, searched after the kit's own extensions.
    pub kext_roots: Vec<PathBuf>,
    pub config: ToolConfig,
}

/// Milestones reported while preparing a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'p> {
    ReportSelected(&'p Path),
    SymbolKitSelected(&'p Path),
    ModuleResolved { name: &'p str, path: &'p Path },
}

/// Everything computed before the debugger runs.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub report_path: PathBuf,
    pub report: PanicReport,
    pub kit: SymbolKitLayout,
    pub search_roots: Vec<PathBuf>,
    pub modules: ModulePathTable,
    pub script: CommandScript,
}

/// Runs the pipeline against injected descriptor-reading and debugger backends.
pub struct Symbolicator<'a> {
    reader: &'a dyn DescriptorReader,
    debugger: &'a dyn Debugger,
}

impl<'a> Symbolicator<'a> {
    pub fn new(reader: &'a dyn DescriptorReader, debugger: &'a dyn Debugger) -> Self {
        Self { reader, debugger }
    }

    pub fn prepare(&self, request: &SymbolicateRequest) -> SymbolicateResult<Prepared> {
        self.prepare_with_progress(request, |_| {})
    }

    /// Parse, locate the kit, resolve modules, and build the script.
    pub fn prepare_with_progress<F>(
        &self,
        request: &SymbolicateRequest,
        mut on_progress: F,
    ) -> SymbolicateResult<Prepared>
    where
        F: FnMut(Progress<'_>),
    {
        let (report_path, report) = load_report(request)?;
        on_progress(Progress::ReportSelected(&report_path));

        let kit_root = match &request.symbol_kit {
            Some(kit) => kit.clone(),
            None => find_symbol_kit(&request.config.kdk_dir, &report.kernel_version)?,
        };
        let kit = SymbolKitLayout::new(kit_root);
        on_progress(Progress::SymbolKitSelected(&kit.root));

        let search_roots = search_roots(&kit, &request.kext_roots);
        let modules = ModuleResolver::new(self.reader).resolve_with_progress(
            &report.extensions,
            &search_roots,
            |name, path| on_progress(Progress::ModuleResolved { name, path }),
        )?;

        let script = script::build(&report, &kit, &modules);
        info!("generated {} debugger commands", script.len());

        Ok(Prepared { report_path, report, kit, search_roots, modules, script })
    }

    /// Hand the prepared script to the debugger.
    pub fn run(&self, prepared: &Prepared) -> SymbolicateResult<Vec<String>> {
        info!("running {} with {} commands", self.debugger.name(), prepared.script.len());
        self.debugger.execute(&prepared.script)
    }

    pub fn symbolicate(&self, request: &SymbolicateRequest) -> SymbolicateResult<Vec<String>> {
        let prepared = self.prepare(request)?;
        self.run(&prepared)
    }
}

/// Pick the report (explicit or newest default) and parse it.
pub fn load_report(request: &SymbolicateRequest) -> SymbolicateResult<(PathBuf, PanicReport)> {
    let path = match &request.report {
        Some(path) => path.clone(),
        None => newest_report(&request.config.reports_dir)?,
    };
    let report = parse_report_file(&path)?;
    Ok((path, report))
}

/// The kit's extension directory, then the caller's roots in order.
pub fn search_roots(kit: &SymbolKitLayout, extra: &[PathBuf]) -> Vec<PathBuf> {
    std::iter::once(kit.extensions_dir.clone()).chain(extra.iter().cloned()).collect()
}
