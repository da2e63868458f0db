//! Execution engine for the counter machine.
//!
//! Implements the label-indexed interpretation loop: snapshot, look up,
//! grow registers, dispatch, advance the step counter.

use crate::machine::{Instruction, Label, Program, RegisterFile};
use crate::machine::trace::{TraceEvent, TraceObserver};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Machine is running normally.
    Running,
    /// Machine executed a `halt` instruction.
    ProperHalt,
    /// Control reached a label with no instruction.
    ErroneousHalt,
}

/// How a finished run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The machine executed `halt`.
    ProperHalt {
        step_count: u64,
        final_label: Label,
        final_registers: RegisterFile,
    },
    /// The machine jumped to an undefined label.
    ErroneousHalt {
        step_count: u64,
        final_label: Label,
        final_registers: RegisterFile,
    },
}

impl Outcome {
    /// Number of loop iterations, including the terminal one. Equal to the
    /// number of trace events emitted.
    pub fn step_count(&self) -> u64 {
        match self {
            Outcome::ProperHalt { step_count, .. } => *step_count,
            Outcome::ErroneousHalt { step_count, .. } => *step_count,
        }
    }

    /// Step number of the terminal trace event.
    pub fn final_step(&self) -> u64 {
        self.step_count().saturating_sub(1)
    }

    /// Label the machine stopped at.
    pub fn final_label(&self) -> &Label {
        match self {
            Outcome::ProperHalt { final_label, .. } => final_label,
            Outcome::ErroneousHalt { final_label, .. } => final_label,
        }
    }

    /// Register values when the machine stopped.
    pub fn final_registers(&self) -> &RegisterFile {
        match self {
            Outcome::ProperHalt { final_registers, .. } => final_registers,
            Outcome::ErroneousHalt { final_registers, .. } => final_registers,
        }
    }

    /// Check if the run ended with an executed `halt`.
    pub fn is_proper(&self) -> bool {
        matches!(self, Outcome::ProperHalt { .. })
    }
}

/// A counter machine bound to one program and one starting configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Machine {
    program: Program,
    start_label: Label,
    initial_registers: RegisterFile,
    /// Label of the next step.
    pub label: Label,
    /// Register file.
    pub registers: RegisterFile,
    /// Current execution state.
    pub state: MachineState,
    /// Loop iterations executed so far.
    pub steps: u64,
}

impl Machine {
    /// Create a machine positioned at `start_label` with `registers` as the
    /// initial register values.
    pub fn new(program: Program, start_label: Label, registers: RegisterFile) -> Self {
        Self {
            program,
            label: start_label.clone(),
            start_label,
            registers: registers.clone(),
            initial_registers: registers,
            state: MachineState::Running,
            steps: 0,
        }
    }

    /// Return to the starting configuration.
    pub fn reset(&mut self) {
        self.label = self.start_label.clone();
        self.registers = self.initial_registers.clone();
        self.state = MachineState::Running;
        self.steps = 0;
    }

    /// The program being executed.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The label the machine starts (and resets) at.
    pub fn start_label(&self) -> &Label {
        &self.start_label
    }

    /// Snapshot of the current state as a trace event.
    pub fn snapshot(&self) -> TraceEvent {
        TraceEvent {
            step: self.steps,
            label: self.label.clone(),
            registers: self.registers.clone(),
        }
    }

    /// The instruction at the current label, if defined.
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.program.get(&self.label)
    }

    /// Execute one loop iteration.
    ///
    /// Returns the trace event captured before the step ran.
    pub fn step(&mut self) -> Result<TraceEvent, MachineError> {
        if self.state != MachineState::Running {
            return Err(MachineError::NotRunning(self.state));
        }
        Ok(self.advance())
    }

    /// One loop iteration on a running machine.
    fn advance(&mut self) -> TraceEvent {
        let event = self.snapshot();
        trace!(step = event.step, label = %event.label, registers = %event.registers, "step");

        let instr = match self.program.get(&self.label) {
            Some(instr) => instr,
            None => {
                self.state = MachineState::ErroneousHalt;
                self.steps += 1;
                debug!(label = %self.label, steps = self.steps, "erroneous halt");
                return event;
            }
        };

        if let Some(register) = instr.register() {
            self.registers.ensure(register);
        }

        match instr {
            Instruction::Halt => {
                self.state = MachineState::ProperHalt;
                debug!(label = %self.label, steps = self.steps + 1, "proper halt");
            }

            Instruction::Increment { register, next } => {
                self.registers.increment(*register);
                self.label = next.clone();
            }

            Instruction::Decrement { register, nonzero, zero } => {
                self.label = if self.registers.decrement(*register) {
                    nonzero.clone()
                } else {
                    zero.clone()
                };
            }
        }

        self.steps += 1;
        event
    }

    /// Run until a halt, reporting every step to `observer`.
    ///
    /// A non-halting program makes this loop forever.
    pub fn run<O: TraceObserver>(&mut self, mut observer: O) -> Result<Outcome, MachineError> {
        while self.state == MachineState::Running {
            let event = self.step()?;
            observer.on_step(&event);
        }
        self.outcome().ok_or(MachineError::NotRunning(self.state))
    }

    /// Run for at most `max_steps` iterations.
    ///
    /// Returns `Some(outcome)` if the machine halted within the budget and
    /// `None` if it is still running.
    pub fn run_limited<O: TraceObserver>(
        &mut self,
        max_steps: u64,
        mut observer: O,
    ) -> Result<Option<Outcome>, MachineError> {
        if self.state != MachineState::Running {
            return Err(MachineError::NotRunning(self.state));
        }

        let limit = self.steps.saturating_add(max_steps);
        while self.state == MachineState::Running && self.steps < limit {
            let event = self.step()?;
            observer.on_step(&event);
        }

        Ok(self.outcome())
    }

    /// The outcome of a finished run, or `None` while running.
    pub fn outcome(&self) -> Option<Outcome> {
        let step_count = self.steps;
        let final_label = self.label.clone();
        let final_registers = self.registers.clone();

        match self.state {
            MachineState::Running => None,
            MachineState::ProperHalt => Some(Outcome::ProperHalt {
                step_count,
                final_label,
                final_registers,
            }),
            MachineState::ErroneousHalt => Some(Outcome::ErroneousHalt {
                step_count,
                final_label,
                final_registers,
            }),
        }
    }

    /// Check if the machine has halted (properly or erroneously).
    pub fn is_halted(&self) -> bool {
        self.state != MachineState::Running
    }

    /// Check if the machine is running.
    pub fn is_running(&self) -> bool {
        self.state == MachineState::Running
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("label", &self.label)
            .field("registers", &self.registers)
            .finish()
    }
}

/// Run `program` from `start_label` to a halt, collecting the full trace.
///
/// Pure function of its inputs: identical arguments give identical traces
/// and outcomes. Loops forever on a non-halting program.
pub fn execute(
    program: &Program,
    start_label: &Label,
    initial_registers: &RegisterFile,
) -> (Outcome, Vec<TraceEvent>) {
    let mut machine = Machine::new(
        program.clone(),
        start_label.clone(),
        initial_registers.clone(),
    );
    let mut events = Vec::new();

    loop {
        events.push(machine.advance());
        if let Some(outcome) = machine.outcome() {
            return (outcome, events);
        }
    }
}

/// Errors that can occur while driving a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("machine not running: {0:?}")]
    NotRunning(MachineState),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::trace::NoTrace;

    fn program(defs: Vec<(&str, Instruction)>) -> Program {
        let mut program = Program::new();
        for (label, instr) in defs {
            program.define(label.into(), instr);
        }
        program
    }

    fn inc(register: usize, next: &str) -> Instruction {
        Instruction::Increment { register, next: next.into() }
    }

    fn dec(register: usize, nonzero: &str, zero: &str) -> Instruction {
        Instruction::Decrement { register, nonzero: nonzero.into(), zero: zero.into() }
    }

    fn regs(values: &[u64]) -> RegisterFile {
        RegisterFile::from_values(values.to_vec())
    }

    fn machine(defs: Vec<(&str, Instruction)>, start: &str, regs: Vec<u64>) -> Machine {
        Machine::new(program(defs), start.into(), RegisterFile::from_values(regs))
    }

    #[test]
    fn test_halt() {
        let mut m = machine(vec![("a", Instruction::Halt)], "a", vec![4]);
        let outcome = m.run(NoTrace).unwrap();

        assert!(outcome.is_proper());
        assert_eq!(outcome.step_count(), 1);
        assert_eq!(outcome.final_registers(), &regs(&[4]));
    }

    #[test]
    fn test_undefined_start_label() {
        let mut m = machine(vec![("a", Instruction::Halt)], "x", vec![1, 2]);
        let mut events: Vec<TraceEvent> = Vec::new();
        let outcome = m.run(&mut events).unwrap();

        assert!(!outcome.is_proper());
        assert_eq!(outcome.final_step(), 0);
        assert_eq!(outcome.final_label(), &Label::new("x"));
        assert_eq!(outcome.final_registers(), &regs(&[1, 2]));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_dec_zero_branch() {
        let mut m = machine(vec![("a", dec(0, "b", "c"))], "a", vec![0]);
        m.step().unwrap();

        assert_eq!(m.label, Label::new("c"));
        assert_eq!(m.registers, regs(&[0]));
    }

    #[test]
    fn test_dec_nonzero_branch() {
        let mut m = machine(vec![("a", dec(0, "b", "c"))], "a", vec![3]);
        m.step().unwrap();

        assert_eq!(m.label, Label::new("b"));
        assert_eq!(m.registers, regs(&[2]));
    }

    #[test]
    fn test_inc() {
        let mut m = machine(vec![("a", inc(0, "b"))], "a", vec![0]);
        m.step().unwrap();

        assert_eq!(m.label, Label::new("b"));
        assert_eq!(m.registers, regs(&[1]));
    }

    #[test]
    fn test_register_growth_on_fetch() {
        let mut m = machine(vec![("a", dec(4, "b", "c"))], "a", vec![5, 6]);
        m.step().unwrap();

        assert_eq!(m.registers, regs(&[5, 6, 0, 0, 0]));
        assert_eq!(m.label, Label::new("c"));
    }

    #[test]
    fn test_halt_grows_nothing() {
        let mut m = machine(vec![("a", Instruction::Halt)], "a", vec![]);
        m.run(NoTrace).unwrap();
        assert!(m.registers.is_empty());
    }

    #[test]
    fn test_step_after_halt() {
        let mut m = machine(vec![("a", Instruction::Halt)], "a", vec![]);
        m.run(NoTrace).unwrap();

        assert_eq!(m.step(), Err(MachineError::NotRunning(MachineState::ProperHalt)));
        assert!(m.run_limited(10, NoTrace).is_err());
    }

    #[test]
    fn test_trace_precedes_step() {
        let mut m = machine(
            vec![("a", dec(0, "b", "c")), ("c", Instruction::Halt)],
            "a",
            vec![0],
        );
        let mut events: Vec<TraceEvent> = Vec::new();
        let outcome = m.run(&mut events).unwrap();

        assert_eq!(events[0].step, 0);
        assert_eq!(events[0].label, Label::new("a"));
        assert_eq!(events[1].step, 1);
        assert_eq!(events[1].label, Label::new("c"));
        assert_eq!(outcome.step_count(), 2);
        assert_eq!(outcome.final_label(), &Label::new("c"));
    }

    #[test]
    fn test_run_limited_on_infinite_loop() {
        let mut m = machine(vec![("a", inc(0, "a"))], "a", vec![]);

        assert_eq!(m.run_limited(100_000, NoTrace).unwrap(), None);
        assert_eq!(m.steps, 100_000);
        assert_eq!(m.registers, regs(&[100_000]));
        assert_eq!(m.label, Label::new("a"));

        assert_eq!(m.run_limited(5, NoTrace).unwrap(), None);
        assert_eq!(m.registers, regs(&[100_005]));
    }

    #[test]
    fn test_reset() {
        let mut m = machine(vec![("a", inc(1, "b"))], "a", vec![2]);
        m.run(NoTrace).unwrap();
        assert!(m.is_halted());

        m.reset();
        assert!(m.is_running());
        assert_eq!(m.steps, 0);
        assert_eq!(m.label, Label::new("a"));
        assert_eq!(m.registers, regs(&[2]));
    }

    #[test]
    fn test_execute_addition() {
        // r0 := r0 + r1
        let p = program(vec![
            ("1", dec(1, "2", "3")),
            ("2", inc(0, "1")),
            ("3", Instruction::Halt),
        ]);
        let (outcome, events) = execute(&p, &"1".into(), &regs(&[2, 3]));

        assert!(outcome.is_proper());
        assert_eq!(outcome.final_registers(), &regs(&[5, 0]));
        assert_eq!(events.len() as u64, outcome.step_count());
    }

    #[test]
    fn test_increment_beyond_u64() {
        let mut m = machine(
            vec![("a", inc(0, "b")), ("b", Instruction::Halt)],
            "a",
            vec![u64::MAX],
        );
        let outcome = m.run(NoTrace).unwrap();

        assert!(outcome.is_proper());
        assert_eq!(outcome.final_registers().to_string(), "(18446744073709551616,)");
    }
}
