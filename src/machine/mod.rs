//! Counter machine emulation.
//!
//! This module implements the Minsky register machine:
//! - an unbounded, lazily materialized file of non-negative registers
//! - a label-indexed table of `inc` / `dec` / `halt` instructions
//! - an execution loop emitting one trace event per step

pub mod instruction;
pub mod registers;
pub mod trace;
pub mod execute;

pub use instruction::{Instruction, Label, Program};
pub use registers::{RegisterFile, MAX_REGISTER};
pub use trace::{FnObserver, NoTrace, TraceEvent, TraceObserver};
pub use execute::{execute, Machine, MachineError, MachineState, Outcome};
