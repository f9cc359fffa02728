use std::fs;
use std::path::Path;

use kpanic_core::config::ToolConfig;
use kpanic_core::pipeline::Progress;
use kpanic_sym::commands::{build_request, load_tool_config, progress_line, SymbolicateOptions};
use tempfile::tempdir;

#[test]
fn build_request_makes_paths_absolute_and_keeps_kext_order() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("Kernel.panic");
    fs::write(&report, "x").unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    let options = SymbolicateOptions {
        report: Some(report.to_string_lossy().to_string()),
        kdk: None,
        kexts: vec![second.to_string_lossy().to_string(), first.to_string_lossy().to_string()],
        ..Default::default()
    };
    let request = build_request(&options).unwrap();
    assert_eq!(request.report, Some(report.canonicalize().unwrap()));
    assert_eq!(request.symbol_kit, None);
    assert_eq!(
        request.kext_roots,
        vec![second.canonicalize().unwrap(), first.canonicalize().unwrap()]
    );
}

#[test]
fn load_tool_config_reads_json_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("kpanic.json");
    fs::write(&path, r#"{"reports_dir":"/tmp/reports"}"#).unwrap();

    let from_file = ToolConfig::from_file(&path).unwrap();
    assert_eq!(from_file.reports_dir, Path::new("/tmp/reports"));
    assert_eq!(from_file.kdk_dir, ToolConfig::default().kdk_dir);

    let config = load_tool_config(Some(&path.to_string_lossy())).unwrap();
    assert_eq!(config, from_file.with_env_overrides());
}

#[test]
fn load_tool_config_errors_on_missing_file() {
    let temp = tempdir().unwrap();
    let err = load_tool_config(Some(&temp.path().join("nope.json").to_string_lossy())).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"), "unexpected error: {err}");
}

#[test]
fn progress_lines_name_each_milestone() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("Kernel.panic");
    fs::write(&report, "x").unwrap();

    let line = progress_line(Progress::ReportSelected(&report));
    assert!(line.contains("Report:") && line.contains("modified"), "{line}");

    let missing = progress_line(Progress::ReportSelected(Path::new("/no/such/report.panic")));
    assert_eq!(missing, "  Report: /no/such/report.panic");

    assert_eq!(progress_line(Progress::SymbolKitSelected(Path::new("/kdk"))), "  KDK:    /kdk");
    assert_eq!(
        progress_line(Progress::ModuleResolved {
            name: "com.example.foo",
            path: Path::new("/x/Foo.kext/Contents/MacOS/Foo"),
        }),
        "  Kext:   com.example.foo -> /x/Foo.kext/Contents/MacOS/Foo"
    );
}
