use anyhow::Result;
use clap::Parser;
use kpanic_sym::commands::{symbolicate_command, SymbolicateOptions};
use kpanic_sym::normalize_args;

/// Symbolicate a macOS kernel panic backtrace.
///
/// This CLI is a thin wrapper around `kpanic-core` (exposed in code as `kpanic_core`).
/// The single-dash spellings `-report`, `-kdk`, `-kext` and `-?` are accepted
/// as aliases of the long flags.
#[derive(Parser, Debug)]
#[command(
    name = "kpanic-sym",
    version,
    about = "Symbolicate a macOS kernel panic backtrace with lldb and a Kernel Debug Kit",
    long_about = None
)]
struct Cli {
    /// Panic report to read. Defaults to the newest Kernel*.panic or
    /// panic-full*.panic in the diagnostic reports directory.
    #[arg(long, value_name = "PATH")]
    report: Option<String>,

    /// Kernel Debug Kit to load symbols from. Defaults to the installed KDK
    /// matching the report's OS build.
    #[arg(long, value_name = "PATH")]
    kdk: Option<String>,

    /// Extra kext bundle, or directory of bundles, searched after the KDK's
    /// extensions (repeatable).
    #[arg(long = "kext", value_name = "PATH")]
    kexts: Vec<String>,

    /// JSON file overriding default directories and tool locations.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Print the generated debugger script instead of running lldb.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Print the parsed report as JSON and exit.
    #[arg(long, default_value_t = false, conflicts_with = "dry_run")]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let options = SymbolicateOptions {
        report: cli.report,
        kdk: cli.kdk,
        kexts: cli.kexts,
        config: cli.config,
        dry_run: cli.dry_run,
        json: cli.json,
    };

    symbolicate_command(&options)
}
