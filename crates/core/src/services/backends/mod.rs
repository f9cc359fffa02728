pub mod lldb;
pub mod plutil;

pub use lldb::{filter_debugger_line, LldbDebugger};
pub use plutil::{parse_descriptor_json, PlutilReader};
