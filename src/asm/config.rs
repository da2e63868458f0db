//! Initial configuration line.
//!
//! The first significant line of a program names the start label and the
//! initial register values:
//! ```text
//! # start at label 1 with r0 = 3, r1 = 4
//! 1, 3, 4
//! ```
//! Text around the comma-separated run is ignored, so `init(1,3,4)` reads
//! the same.

use crate::asm::parser::LoadError;
use crate::asm::source::SourceLine;
use crate::machine::{Label, RegisterFile};
use dashu::integer::UBig;
use serde::{Serialize, Deserialize};

/// Where a run starts and what the registers hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Label of the first instruction to execute.
    pub start_label: Label,
    /// Initial register values, starting at r0.
    pub registers: RegisterFile,
}

impl Configuration {
    /// Create a configuration.
    pub fn new(start_label: Label, registers: RegisterFile) -> Self {
        Self { start_label, registers }
    }

    /// The initial register values as a register file.
    pub fn register_file(&self) -> RegisterFile {
        self.registers.clone()
    }
}

/// Parse a normalized configuration line.
///
/// Takes the leftmost of two shapes:
/// - `<word>,<digits>(,<digits>)*` where the word is ASCII letters and
///   underscores only, so `a,0` starts at label `a`;
/// - `<digits>(,<digits>)*` anywhere in the line, even inside a longer
///   token, so `x1,2,3` starts at label `1`.
///
/// A digit run with no following values becomes a start label with no
/// registers.
pub fn parse_config(line: &SourceLine) -> Result<Configuration, LoadError> {
    let chars: Vec<char> = line.text.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let end = scan(&chars, i, |c| c.is_ascii_digit());
            let label: String = chars[i..end].iter().collect();
            let (values, _) = value_run(&chars, end);
            return Ok(Configuration::new(Label::new(&label), values));
        }

        if !is_word(chars[i]) || (i > 0 && is_word(chars[i - 1])) {
            i += 1;
            continue;
        }

        let word_end = scan(&chars, i, is_word);
        if chars[i..word_end].iter().any(|c| c.is_ascii_digit()) {
            // mixed token: its digits are picked up on the next positions
            i += 1;
            continue;
        }

        let (values, count) = value_run(&chars, word_end);
        if count > 0 {
            let word: String = chars[i..word_end].iter().collect();
            return Ok(Configuration::new(Label::new(&word), values));
        }
        i = word_end;
    }

    Err(LoadError::ConfigFormat {
        line: Some(line.number),
        message: format!(
            "expected `start label, register values...`, found `{}`",
            line.text
        ),
    })
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// End of the run of characters matching `pred` starting at `start`.
fn scan(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|&c| !pred(c))
        .map_or(chars.len(), |offset| start + offset)
}

/// Read `(,<digits>)*` starting at `pos`.
fn value_run(chars: &[char], mut pos: usize) -> (RegisterFile, usize) {
    let mut values = Vec::new();
    while pos + 1 < chars.len() && chars[pos] == ',' && chars[pos + 1].is_ascii_digit() {
        let end = scan(chars, pos + 1, |c| c.is_ascii_digit());
        values.push(parse_value(&chars[pos + 1..end]));
        pos = end;
    }
    let count = values.len();
    (RegisterFile::from_big(values), count)
}

fn parse_value(digits: &[char]) -> UBig {
    digits.iter().fold(UBig::ZERO, |acc, &c| {
        acc * UBig::from(10u8) + UBig::from(c as u8 - b'0')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Configuration, LoadError> {
        parse_config(&SourceLine::new(1, text))
    }

    fn regs(values: &[u64]) -> RegisterFile {
        RegisterFile::from_values(values.to_vec())
    }

    #[test]
    fn test_numeric_config() {
        let config = parse("5,1,2,3").unwrap();
        assert_eq!(config.start_label, Label::new("5"));
        assert_eq!(config.registers, regs(&[1, 2, 3]));
    }

    #[test]
    fn test_named_start_label() {
        let config = parse("a,0").unwrap();
        assert_eq!(config.start_label, Label::new("a"));
        assert_eq!(config.registers, regs(&[0]));

        let config = parse("start_here,4").unwrap();
        assert_eq!(config.start_label, Label::new("start_here"));
        assert_eq!(config.registers, regs(&[4]));
    }

    #[test]
    fn test_mixed_token_uses_digit_run() {
        let config = parse("x1,2,3").unwrap();
        assert_eq!(config.start_label, Label::new("1"));
        assert_eq!(config.registers, regs(&[2, 3]));

        let config = parse(&crate::asm::source::normalize("Start 5, 1, 2")).unwrap();
        assert_eq!(config.start_label, Label::new("5"));
        assert_eq!(config.registers, regs(&[1, 2]));
    }

    #[test]
    fn test_non_ascii_letters_are_not_words() {
        let config = parse("é,1").unwrap();
        assert_eq!(config.start_label, Label::new("1"));
        assert!(config.registers.is_empty());

        assert!(matches!(parse("é,x"), Err(LoadError::ConfigFormat { .. })));
    }

    #[test]
    fn test_surrounding_text_ignored() {
        let config = parse("init(1,3,4)").unwrap();
        assert_eq!(config.start_label, Label::new("1"));
        assert_eq!(config.registers, regs(&[3, 4]));

        let config = parse("start:7,0,0;").unwrap();
        assert_eq!(config.start_label, Label::new("7"));
        assert_eq!(config.registers, regs(&[0, 0]));
    }

    #[test]
    fn test_label_only() {
        let config = parse("start(7)").unwrap();
        assert_eq!(config.start_label, Label::new("7"));
        assert!(config.registers.is_empty());
    }

    #[test]
    fn test_run_stops_at_non_digit() {
        let config = parse("1,2,x,3").unwrap();
        assert_eq!(config.start_label, Label::new("1"));
        assert_eq!(config.registers, regs(&[2]));
    }

    #[test]
    fn test_no_numeric_run() {
        assert!(matches!(parse("start"), Err(LoadError::ConfigFormat { .. })));
        assert!(matches!(parse("a,b"), Err(LoadError::ConfigFormat { .. })));
    }

    #[test]
    fn test_values_beyond_u64() {
        let config = parse("1,99999999999999999999999").unwrap();
        assert_eq!(config.registers.to_string(), "(99999999999999999999999,)");
    }
}
