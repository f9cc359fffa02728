use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const NO_KEXT_REPORT: &str = "\
Backtrace (CPU 0), Frame : Return Address
0xffffff80e0b3f4a0 : 0xffffff8000af8ef1 
0xffffff80e0b3f520 : 0xffffff8000be4e0b 
      Kernel Extensions in backtrace:

Mac OS version:
15C50

Kernel slide:     0x000000000e400000
";

/// The binary with every default location pointed somewhere harmless.
fn kpanic_sym(sandbox: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kpanic-sym");
    cmd.env("KPANIC_REPORTS_DIR", sandbox.join("reports"))
        .env("KPANIC_KDK_DIR", sandbox.join("kdks"))
        .env("LLDB_BIN", sandbox.join("no-lldb"))
        .env("PLUTIL_BIN", sandbox.join("no-plutil"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn question_mark_prints_usage() {
    let temp = tempdir().unwrap();
    kpanic_sym(temp.path())
        .arg("-?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:").and(predicate::str::contains("--kext")));
}

#[test]
fn unknown_flag_fails_with_usage() {
    let temp = tempdir().unwrap();
    kpanic_sym(temp.path())
        .arg("-bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn json_prints_parsed_report() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("Kernel_2016-01-02-120000_host.panic");
    fs::write(&report, NO_KEXT_REPORT).unwrap();

    let output = kpanic_sym(temp.path())
        .arg("-report")
        .arg(&report)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(parsed["kernel_version"], "15C50");
    assert_eq!(parsed["kernel_slide"], "0x000000000e400000");
    assert_eq!(parsed["extensions"].as_array().unwrap().len(), 0);
    assert_eq!(parsed["backtrace"][1], "0xffffff8000be4e0b");
}

#[test]
fn dry_run_prints_script_from_default_locations() {
    let temp = tempdir().unwrap();
    let reports = temp.path().join("reports");
    fs::create_dir_all(&reports).unwrap();
    fs::write(reports.join("Kernel_2016-01-02-120000_host.panic"), NO_KEXT_REPORT).unwrap();
    let kit = temp.path().join("kdks").join("KDK_10.11.2_15C50.kdk");
    fs::create_dir_all(kit.join("System/Library/Extensions")).unwrap();

    kpanic_sym(temp.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Debugger script (5 commands):"))
        .stdout(predicate::str::contains(
            "target modules load --file kernel --slide 0x000000000e400000",
        ))
        .stdout(predicate::str::contains("image lookup -a 0xffffff8000be4e0b"))
        .stdout(predicate::str::contains("KDK_10.11.2_15C50.kdk"));
}

#[test]
fn missing_reports_fail_with_message() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("reports")).unwrap();
    kpanic_sym(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No kernel panic reports found"));
}

#[test]
fn malformed_report_fails_with_reason() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("broken.panic");
    fs::write(&report, "Mac OS version:\n15C50\nKernel Extensions in backtrace:\n\n").unwrap();
    kpanic_sym(temp.path())
        .args(["-report", report.to_str().unwrap(), "-kdk", temp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing backtrace"));
}

#[test]
fn missing_kdk_names_kernel_version() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("Kernel.panic");
    fs::write(&report, NO_KEXT_REPORT).unwrap();
    kpanic_sym(temp.path())
        .args(["-report", report.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Kernel Debug Kit found for kernel version 15C50"));
}

#[test]
fn unresolved_kext_suggests_kext_flag() {
    let temp = tempdir().unwrap();
    let report = temp.path().join("Kernel.panic");
    let marker = "      Kernel Extensions in backtrace:\n";
    let entry = "         com.example.driver(1.0)[UUID]@0xffffff7f8e2c2000->0xffffff7f8e2fffff\n";
    let text = NO_KEXT_REPORT.replace(marker, &format!("{marker}{entry}"));
    fs::write(&report, text).unwrap();
    let kit = temp.path().join("kit");
    fs::create_dir_all(kit.join("System/Library/Extensions")).unwrap();

    kpanic_sym(temp.path())
        .args(["-report", report.to_str().unwrap(), "-kdk", kit.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not resolve kext com.example.driver"))
        .stderr(predicate::str::contains("-kext"));
}
