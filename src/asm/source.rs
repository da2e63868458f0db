//! Program source text handling.
//!
//! Source format:
//! - Blank lines and lines starting with `#` are ignored
//! - Everything else is lower-cased and stripped of whitespace
//! - The first surviving line is the configuration, the rest are
//!   instructions

use crate::asm::parser::{load, LoadError, LoadedProgram};
use std::path::Path;
use tracing::debug;

/// One significant line of program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the original text.
    pub number: usize,
    /// Normalized line content.
    pub text: String,
}

impl SourceLine {
    /// Create a line, normalizing its text.
    pub fn new(number: usize, raw: &str) -> Self {
        Self {
            number,
            text: normalize(raw),
        }
    }
}

/// Lower-case and drop all whitespace.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split source text into its significant, normalized lines.
pub fn significant_lines(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(i, raw)| SourceLine::new(i + 1, raw))
        .filter(|line| !line.text.is_empty() && !line.text.starts_with('#'))
        .collect()
}

/// Load a program file from disk.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedProgram, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = source.len(), "read program source");
    load(&source)
}
