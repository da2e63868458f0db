//! Loading and listing counter machine programs.
//!
//! This module provides:
//! - Source preprocessing (comments, blank lines, normalization)
//! - The configuration and instruction parsers (text → validated program)
//! - A listing formatter (program → canonical text)

pub mod config;
pub mod listing;
pub mod parser;
pub mod source;

pub use config::{parse_config, Configuration};
pub use listing::{format_instruction, format_program};
pub use parser::{load, parse_program, LoadError, LoadedProgram};
pub use source::{load_file, significant_lines, SourceLine};
