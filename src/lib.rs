//! # Minsky Machine
//!
//! A simulator for Minsky counter machines.
//!
//! A counter machine has an unbounded row of non-negative registers and a
//! table of labeled instructions using only increment, conditional
//! decrement and halt. Despite that, it is Turing-complete, so a run may
//! legitimately never end.

pub mod machine;
pub mod asm;
pub mod report;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use machine::{
    execute, Instruction, Label, Machine, MachineError, MachineState, NoTrace, Outcome, Program,
    RegisterFile, TraceEvent, TraceObserver, MAX_REGISTER,
};
pub use asm::{format_program, load, load_file, Configuration, LoadError, LoadedProgram};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
