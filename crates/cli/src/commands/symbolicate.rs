use anyhow::{Context, Result};
use kpanic_core::pipeline::{load_report, SymbolicateRequest, Symbolicator};
use kpanic_core::services::backends::{LldbDebugger, PlutilReader};
use kpanic_core::services::Debugger;

use crate::absolute_path;
use crate::commands::{load_tool_config, progress_line};

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct SymbolicateOptions {
    pub report: Option<String>,
    pub kdk: Option<String>,
    pub kexts: Vec<String>,
    pub config: Option<String>,
    /// Print the debugger script instead of running it.
    pub dry_run: bool,
    /// Print the parsed report as JSON and stop.
    pub json: bool,
}

/// Turn CLI options into a core request, resolving relative paths.
pub fn build_request(options: &SymbolicateOptions) -> Result<SymbolicateRequest> {
    let config = load_tool_config(options.config.as_deref())?;
    let report = options.report.as_deref().map(absolute_path).transpose()?;
    let symbol_kit = options.kdk.as_deref().map(absolute_path).transpose()?;
    let kext_roots =
        options.kexts.iter().map(|kext| absolute_path(kext)).collect::<Result<Vec<_>>>()?;

    Ok(SymbolicateRequest { report, symbol_kit, kext_roots, config })
}

/// Symbolicate a panic report and print the resolved backtrace.
pub fn symbolicate_command(options: &SymbolicateOptions) -> Result<()> {
    let request = build_request(options)?;

    if options.json {
        let (_path, report) = load_report(&request).context("Failed to load panic report")?;
        let serialized =
            serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")?;
        println!("{serialized}");
        return Ok(());
    }

    let reader = PlutilReader::new(&request.config.plutil);
    let debugger = LldbDebugger::new(&request.config.lldb);
    let symbolicator = Symbolicator::new(&reader, &debugger);

    println!("Preparing symbolication:");
    let prepared = symbolicator
        .prepare_with_progress(&request, |event| println!("{}", progress_line(event)))
        .context("Failed to prepare symbolication")?;

    if options.dry_run {
        println!("Debugger script ({} commands):", prepared.script.len());
        print!("{}", prepared.script);
        return Ok(());
    }

    println!(
        "Running {} ({} commands, script at {})...",
        debugger.name(),
        prepared.script.len(),
        debugger.script_path().display()
    );
    let lines = symbolicator.run(&prepared).context("Failed to run the debugger")?;

    println!("Symbolicated backtrace ({}):", lines.len());
    for line in lines {
        println!(" - {line}");
    }

    Ok(())
}
