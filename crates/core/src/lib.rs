//! crashsift-core
//!
//! Core library for post-mortem crash triage.
//!
//! Given a core dump, this crate locates the executable that produced it, drives an
//! external debugger (gdb first, dbx as a fallback) against the pair, and parses the
//! debugger's backtrace text into a short summary plus a detail block.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the `crashsift` CLI is a thin wrapper.

pub mod config;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
