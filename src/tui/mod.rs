//! TUI debugger for counter machine programs.
//!
//! Provides an interactive terminal-based debugger with:
//! - Program listing with the current label highlighted
//! - Register view
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
