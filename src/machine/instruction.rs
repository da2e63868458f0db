//! Instruction set and program table.
//!
//! A counter machine knows exactly three instructions:
//! - `inc(rN), next`: increment register N, continue at `next`
//! - `dec(rN), nz, z`: if register N is positive decrement it and continue
//!   at `nz`, otherwise continue at `z`
//! - `halt`: stop

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

/// A label naming one instruction slot.
///
/// Labels are stored in their normalized form (lower-case, no whitespace)
/// so that labels read from the configuration line and from instruction
/// lines compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Create a label, normalizing it the same way program text is.
    pub fn new(name: &str) -> Self {
        Self(
            name.chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(char::to_lowercase)
                .collect(),
        )
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A decoded counter machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Stop the machine (proper halt).
    Halt,

    /// `registers[register] += 1`, then jump to `next`.
    Increment { register: usize, next: Label },

    /// If `registers[register] > 0` decrement it and jump to `nonzero`,
    /// otherwise jump to `zero`.
    Decrement { register: usize, nonzero: Label, zero: Label },
}

impl Instruction {
    /// The register this instruction touches, if any.
    pub fn register(&self) -> Option<usize> {
        match self {
            Instruction::Halt => None,
            Instruction::Increment { register, .. } => Some(*register),
            Instruction::Decrement { register, .. } => Some(*register),
        }
    }

    /// Labels control may transfer to after this instruction.
    pub fn successors(&self) -> Vec<&Label> {
        match self {
            Instruction::Halt => Vec::new(),
            Instruction::Increment { next, .. } => vec![next],
            Instruction::Decrement { nonzero, zero, .. } => vec![nonzero, zero],
        }
    }

    /// Check if this is a halt.
    pub fn is_halt(&self) -> bool {
        matches!(self, Instruction::Halt)
    }
}

/// An immutable table of labeled instructions.
///
/// Definitions keep their source order for listings; lookups go through
/// the label map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: BTreeMap<Label, Instruction>,
    order: Vec<Label>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. The caller rejects duplicate labels first.
    pub(crate) fn define(&mut self, label: Label, instr: Instruction) {
        debug_assert!(!self.contains(&label), "label {} defined twice", label);
        self.order.push(label.clone());
        self.instructions.insert(label, instr);
    }

    /// Look up the instruction at a label.
    pub fn get(&self, label: &Label) -> Option<&Instruction> {
        self.instructions.get(label)
    }

    /// Check if a label is defined.
    pub fn contains(&self, label: &Label) -> bool {
        self.instructions.contains_key(label)
    }

    /// Number of defined instructions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over definitions in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Instruction)> {
        self.order.iter().map(move |label| (label, &self.instructions[label]))
    }

    /// Highest register index referenced by any instruction.
    pub fn max_register(&self) -> Option<usize> {
        self.instructions.values().filter_map(Instruction::register).max()
    }

    /// Target labels with no definition, in source order, deduplicated.
    ///
    /// Jumping to one of these ends the run in an erroneous halt.
    pub fn undefined_targets(&self) -> Vec<&Label> {
        let mut missing: Vec<&Label> = Vec::new();
        for (_, instr) in self.iter() {
            for target in instr.successors() {
                if !self.contains(target) && !missing.contains(&target) {
                    missing.push(target);
                }
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_normalization() {
        assert_eq!(Label::new(" Loop A "), Label::new("loopa"));
        assert_eq!(Label::new("5").as_str(), "5");
    }

    #[test]
    fn test_define_and_lookup() {
        let mut program = Program::new();
        program.define("a".into(), Instruction::Halt);

        assert!(program.contains(&Label::new("a")));
        assert_eq!(program.get(&Label::new("a")), Some(&Instruction::Halt));
        assert_eq!(program.get(&Label::new("b")), None);
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_source_order_kept() {
        let mut program = Program::new();
        program.define("z".into(), Instruction::Halt);
        program.define("a".into(), Instruction::Halt);
        let labels: Vec<&str> = program.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["z", "a"]);
    }

    #[test]
    fn test_undefined_targets() {
        let mut program = Program::new();
        program.define("a".into(), Instruction::Decrement {
            register: 3,
            nonzero: "a".into(),
            zero: "b".into(),
        });
        program.define("c".into(), Instruction::Increment {
            register: 0,
            next: "b".into(),
        });

        assert_eq!(program.undefined_targets(), vec![&Label::new("b")]);
        assert_eq!(program.max_register(), Some(3));
    }
}
