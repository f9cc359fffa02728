//! Kernel panic report parser.
//!
//! A report is scanned four times, once per section we care about. Each scan
//! is a small `Seeking -> InSection -> Done` state machine over the lines and
//! ignores everything outside its own section, so sections may appear in any
//! order relative to each other.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{SymbolicateError, SymbolicateResult};
use crate::model::{ExtensionRef, PanicReport};

const VERSION_LABEL: &str = "Mac OS version:";
const SLIDE_PREFIX: &str = "Kernel slide:";
const EXTENSIONS_MARKER: &str = "Kernel Extensions in backtrace:";
const DEPENDENCY_PREFIX: &str = "dependency:";
const BACKTRACE_LABEL: &str = "Backtrace";

/// Width of an address token: `0x` followed by 16 hex digits.
pub const ADDRESS_WIDTH: usize = 18;

/// Column at which the return address starts on a backtrace frame line
/// (`<frame> : <return address>`), counting the separating space.
const RETURN_ADDRESS_COLUMN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Seeking,
    InSection,
    Done,
}

/// Parse report text into a `PanicReport`.
///
/// Fails with `MalformedReport` when the version, the extensions marker, or
/// the backtrace label is missing. A missing kernel slide is tolerated and
/// leaves `kernel_slide` empty.
pub fn parse(text: &str) -> SymbolicateResult<PanicReport> {
    let lines: Vec<&str> = text.lines().collect();

    let kernel_version = scan_version(&lines)?;
    let kernel_slide = scan_slide(&lines);
    if kernel_slide.is_empty() {
        warn!("report has no '{SLIDE_PREFIX}' line; loading the kernel without a slide");
    }
    let extensions = scan_extensions(&lines)?;
    let backtrace = scan_backtrace(&lines)?;

    debug!(
        "parsed report: version={kernel_version} slide={kernel_slide:?} extensions={} frames={}",
        extensions.len(),
        backtrace.len()
    );

    Ok(PanicReport { kernel_version, kernel_slide, extensions, backtrace })
}

/// Read a report from disk, unwrap a JSON envelope if present, and parse it.
pub fn parse_report_file(path: &Path) -> SymbolicateResult<PanicReport> {
    let bytes = fs::read(path).map_err(|e| SymbolicateError::io(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    parse(&unwrap_envelope(&text))
}

#[derive(Deserialize)]
struct PanicEnvelope {
    #[serde(rename = "macOSPanicString")]
    panic_string: String,
}

/// Extract the classic panic text from a JSON-wrapped report.
///
/// Newer systems write a one-line JSON header followed by a JSON body whose
/// `macOSPanicString` field carries the text this parser understands. Plain
/// text reports are returned unchanged.
pub fn unwrap_envelope(text: &str) -> Cow<'_, str> {
    if !text.trim_start().starts_with('{') {
        return Cow::Borrowed(text);
    }

    std::iter::once(text)
        .chain(text.lines())
        .find_map(|candidate| serde_json::from_str::<PanicEnvelope>(candidate).ok())
        .map(|envelope| Cow::Owned(envelope.panic_string))
        .unwrap_or(Cow::Borrowed(text))
}

fn scan_version(lines: &[&str]) -> SymbolicateResult<String> {
    let mut state = ScanState::Seeking;
    let mut version = String::new();

    for line in lines {
        match state {
            ScanState::Seeking => {
                if line.trim_end() == VERSION_LABEL {
                    state = ScanState::InSection;
                }
            }
            ScanState::InSection => {
                version = line.trim().to_string();
                state = ScanState::Done;
            }
            ScanState::Done => break,
        }
    }

    if version.is_empty() {
        return Err(SymbolicateError::malformed("missing kernel version"));
    }
    Ok(version)
}

fn scan_slide(lines: &[&str]) -> String {
    lines
        .iter()
        .find_map(|line| line.strip_prefix(SLIDE_PREFIX))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

fn scan_extensions(lines: &[&str]) -> SymbolicateResult<Vec<ExtensionRef>> {
    let mut state = ScanState::Seeking;
    let mut extensions = Vec::new();

    for line in lines {
        match state {
            ScanState::Seeking => {
                if line.contains(EXTENSIONS_MARKER) {
                    state = ScanState::InSection;
                }
            }
            ScanState::InSection => {
                if line.trim().is_empty() {
                    state = ScanState::Done;
                } else {
                    extensions.push(parse_extension_entry(line)?);
                }
            }
            ScanState::Done => break,
        }
    }

    if state == ScanState::Seeking {
        return Err(SymbolicateError::malformed("missing extensions section"));
    }
    Ok(extensions)
}

/// Parse one entry such as
/// `dependency: com.apple.iokit.IOPCIFamily(2.9)[UUID]@0xffffff7f8d0c6000`.
fn parse_extension_entry(line: &str) -> SymbolicateResult<ExtensionRef> {
    let entry = line.trim();
    let entry = entry.strip_prefix(DEPENDENCY_PREFIX).unwrap_or(entry);

    let (head, address) = entry.split_once('@').ok_or_else(|| {
        SymbolicateError::malformed(format!("extension entry without load address: {entry}"))
    })?;
    let name = head.split_once('(').map_or(head, |(name, _)| name).trim();
    let load_address: String = address.trim().chars().take(ADDRESS_WIDTH).collect();

    Ok(ExtensionRef::new(name, load_address))
}

fn scan_backtrace(lines: &[&str]) -> SymbolicateResult<Vec<String>> {
    let mut state = ScanState::Seeking;
    let mut addresses = Vec::new();

    for line in lines {
        match state {
            ScanState::Seeking => {
                if line.starts_with(BACKTRACE_LABEL) {
                    state = ScanState::InSection;
                }
            }
            ScanState::InSection => {
                if is_frame_line(line) {
                    addresses.push(return_address(line));
                } else {
                    state = ScanState::Done;
                }
            }
            ScanState::Done => break,
        }
    }

    if state == ScanState::Seeking {
        return Err(SymbolicateError::malformed("missing backtrace"));
    }
    Ok(addresses)
}

/// Whether `line` looks like `0x<16 hex> : 0x<16 hex>...`.
fn is_frame_line(line: &str) -> bool {
    let frame = line.get(..ADDRESS_WIDTH);
    let separator = line.get(ADDRESS_WIDTH..RETURN_ADDRESS_COLUMN + 1);
    let ret = line.get(RETURN_ADDRESS_COLUMN + 1..RETURN_ADDRESS_COLUMN + 1 + ADDRESS_WIDTH);

    matches!(
        (frame, separator, ret),
        (Some(frame), Some(" : "), Some(ret)) if is_address_token(frame) && is_address_token(ret)
    )
}

fn is_address_token(token: &str) -> bool {
    token.len() == ADDRESS_WIDTH
        && token.starts_with("0x")
        && token[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Return address of a frame line, without any symbol annotation after it.
fn return_address(line: &str) -> String {
    let rest = line.get(RETURN_ADDRESS_COLUMN..).unwrap_or_default().trim();
    rest.split_once(' ').map_or(rest, |(address, _)| address).to_string()
}
