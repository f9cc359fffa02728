use std::env;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{SymbolicateError, SymbolicateResult};
use crate::model::CommandScript;
use crate::services::Debugger;

/// File name of the generated script inside the temp directory.
pub const SCRIPT_FILE_NAME: &str = "kpanic-sym.lldb";

const SUMMARY_LABEL: &str = "Summary:";

/// Minimum indentation of an lldb summary continuation line (inlined frames).
const CONTINUATION_INDENT: usize = 15;

/// lldb-backed debugger: writes the script to a fixed file and feeds it to
/// lldb's stdin.
#[derive(Debug, Clone)]
pub struct LldbDebugger {
    lldb: PathBuf,
    script_path: PathBuf,
}

impl LldbDebugger {
    pub fn new(lldb: impl Into<PathBuf>) -> Self {
        Self { lldb: lldb.into(), script_path: default_script_path() }
    }

    /// Write the script somewhere other than the default temp file.
    pub fn with_script_path(mut self, script_path: impl Into<PathBuf>) -> Self {
        self.script_path = script_path.into();
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

impl Default for LldbDebugger {
    fn default() -> Self {
        Self::new("lldb")
    }
}

/// Default location of the generated script.
pub fn default_script_path() -> PathBuf {
    env::temp_dir().join(SCRIPT_FILE_NAME)
}

impl Debugger for LldbDebugger {
    fn execute(&self, script: &CommandScript) -> SymbolicateResult<Vec<String>> {
        fs::write(&self.script_path, script.to_string())
            .map_err(|e| SymbolicateError::io(&self.script_path, e))?;
        let stdin =
            File::open(&self.script_path).map_err(|e| SymbolicateError::io(&self.script_path, e))?;

        let mut child = Command::new(&self.lldb)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SymbolicateError::Debugger(format!("failed to spawn {}: {e}", self.lldb.display()))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SymbolicateError::Debugger("lldb stdout was not captured".into()))?;

        let kept = match read_filtered(BufReader::new(stdout)) {
            Ok(kept) => kept,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SymbolicateError::Debugger(format!(
                    "failed to read lldb output: {err}"
                )));
            }
        };

        let status = child
            .wait()
            .map_err(|e| SymbolicateError::Debugger(format!("failed to wait for lldb: {e}")))?;
        if !status.success() {
            return Err(SymbolicateError::Debugger(format!("lldb exited with {status}")));
        }
        Ok(kept)
    }

    fn name(&self) -> &'static str {
        "lldb"
    }
}

/// Filter lldb output line by line. Bytes that are not UTF-8 are replaced,
/// never rejected.
fn read_filtered<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut kept = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        match filter_debugger_line(line) {
            Some(summary) => kept.push(summary),
            None => debug!("lldb: {line}"),
        }
    }
    Ok(kept)
}

/// Keep only symbolication results from lldb output.
///
/// `Summary:` lines yield the text after the label; deeply indented lines
/// (continuations listing inlined frames) yield their trimmed text.
pub fn filter_debugger_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if let Some(summary) = trimmed.strip_prefix(SUMMARY_LABEL) {
        return Some(summary.trim().to_string());
    }

    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent >= CONTINUATION_INDENT && !trimmed.is_empty() {
        return Some(trimmed.to_string());
    }
    None
}
