//! Program parser for counter machine programs.
//!
//! Syntax:
//! ```text
//! # Comment
//! 1, 2, 3                 # configuration: start label, r0, r1
//! 1: dec(r1), 2, 3        # if r1 > 0 { r1 -= 1; goto 2 } else { goto 3 }
//! 2: inc(r0), 1           # r0 += 1; goto 1
//! 3: halt
//! ```
//!
//! Loading is all-or-nothing: the first invalid line aborts it and no
//! partial program is returned.

use crate::asm::config::{parse_config, Configuration};
use crate::asm::source::{significant_lines, SourceLine};
use crate::machine::{execute, Instruction, Label, Machine, Outcome, Program, TraceEvent, MAX_REGISTER};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// A validated program together with its starting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedProgram {
    pub config: Configuration,
    pub program: Program,
}

impl LoadedProgram {
    /// Build a fresh machine at the configured start.
    pub fn machine(&self) -> Machine {
        Machine::new(
            self.program.clone(),
            self.config.start_label.clone(),
            self.config.register_file(),
        )
    }

    /// Run to a halt, collecting the trace.
    pub fn execute(&self) -> (Outcome, Vec<TraceEvent>) {
        execute(&self.program, &self.config.start_label, &self.config.registers)
    }
}

/// Load program text: configuration line first, then instructions.
pub fn load(source: &str) -> Result<LoadedProgram, LoadError> {
    let lines = significant_lines(source);
    let (first, rest) = lines.split_first().ok_or(LoadError::ConfigFormat {
        line: None,
        message: "no configuration line found".into(),
    })?;

    let config = parse_config(first)?;
    let program = parse_program(rest)?;

    debug!(
        start = %config.start_label,
        registers = config.registers.len(),
        instructions = program.len(),
        "loaded program"
    );

    Ok(LoadedProgram { config, program })
}

/// Parse instruction lines into a program.
pub fn parse_program(lines: &[SourceLine]) -> Result<Program, LoadError> {
    let mut program = Program::new();
    let mut defined_at: HashMap<Label, usize> = HashMap::new();

    for line in lines {
        let (label, body) = split_line(line)?;

        if let Some(&first_line) = defined_at.get(&label) {
            return Err(LoadError::DuplicateLabel {
                line: line.number,
                label: label.to_string(),
                first_line,
            });
        }

        let instr = parse_body(body, line)?;
        defined_at.insert(label.clone(), line.number);
        program.define(label, instr);
    }

    Ok(program)
}

/// Split `label:body`.
fn split_line(line: &SourceLine) -> Result<(Label, &str), LoadError> {
    let parts: Vec<&str> = line.text.split(':').collect();
    match parts.as_slice() {
        [label, body] if !label.is_empty() => Ok((Label::new(label), *body)),
        _ => Err(LoadError::InstructionFormat {
            line: line.number,
            text: line.text.clone(),
        }),
    }
}

/// Parse the part after the colon.
fn parse_body(body: &str, line: &SourceLine) -> Result<Instruction, LoadError> {
    let fields: Vec<&str> = body.split(',').collect();

    if fields == ["halt"] {
        return Ok(Instruction::Halt);
    }

    let (op, targets) = (fields[0], &fields[1..]);
    let (name, digits) = parse_operation(op).ok_or_else(|| LoadError::OperationFormat {
        line: line.number,
        text: line.text.clone(),
    })?;
    let register = digits
        .parse::<usize>()
        .ok()
        .filter(|&r| r <= MAX_REGISTER)
        .ok_or_else(|| LoadError::RegisterRange {
            line: line.number,
            register: digits.to_string(),
        })?;

    match (name, targets) {
        ("inc", [next]) => Ok(Instruction::Increment {
            register,
            next: Label::new(next),
        }),
        ("dec", [nonzero, zero]) => Ok(Instruction::Decrement {
            register,
            nonzero: Label::new(nonzero),
            zero: Label::new(zero),
        }),
        ("inc", _) | ("dec", _) => Err(LoadError::Arity {
            line: line.number,
            operation: name.to_string(),
            expected: if name == "inc" { 1 } else { 2 },
            found: targets.len(),
        }),
        _ => Err(LoadError::UnknownOperation {
            line: line.number,
            operation: name.to_string(),
        }),
    }
}

/// Match `<name>(r<digits>)` exactly, returning the name and the register
/// digits.
fn parse_operation(op: &str) -> Option<(&str, &str)> {
    let (name, rest) = op.split_once('(')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let digits = rest.strip_prefix('r')?.strip_suffix(')')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some((name, digits))
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid initial configuration{}: {message}", .line.map(|l| format!(" on line {}", l)).unwrap_or_default())]
    ConfigFormat { line: Option<usize>, message: String },

    #[error("invalid instruction format on line {line}: `{text}` (expected `label: operation, ...arguments`)")]
    InstructionFormat { line: usize, text: String },

    #[error("duplicate label on line {line}: `{label}` already defined on line {first_line}")]
    DuplicateLabel { line: usize, label: String, first_line: usize },

    #[error("invalid operation on line {line}: `{text}` (expected `name(rN)`)")]
    OperationFormat { line: usize, text: String },

    #[error("register out of range on line {line}: `r{register}` (highest is r{max})", max = MAX_REGISTER)]
    RegisterRange { line: usize, register: String },

    #[error("unknown operation on line {line}: `{operation}`")]
    UnknownOperation { line: usize, operation: String },

    #[error("wrong number of arguments on line {line}: `{operation}` takes {expected}, found {found}")]
    Arity { line: usize, operation: String, expected: usize, found: usize },
}
