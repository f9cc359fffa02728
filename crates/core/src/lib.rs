//! kpanic-core
//!
//! Core library for symbolicating macOS kernel panic reports.
//!
//! This crate parses a panic report, resolves the kexts in its backtrace to
//! binaries inside a Kernel Debug Kit (or extra bundle directories), and
//! generates the lldb command script that prints a symbolicated lookup for
//! every return address.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends; external tools (`plutil`, `lldb`) sit
//! behind the traits in `services`.

pub mod config;
pub mod error;
pub mod kit;
pub mod locate;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod script;
pub mod services;

pub use error::{SymbolicateError, SymbolicateResult};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
