//! Debugger application state and logic.

use crate::asm::listing::format_instruction;
use crate::asm::LoadedProgram;
use crate::machine::{Label, Machine};
use crate::report;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub machine: Machine,
    /// Breakpoints (by label).
    pub breakpoints: HashSet<Label>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Register view scroll offset.
    pub reg_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger for a loaded program.
    pub fn new(loaded: LoadedProgram) -> Self {
        Self {
            machine: loaded.machine(),
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            reg_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.machine.is_running() {
            self.halted_status();
            self.running = false;
            return;
        }

        let text = self.machine
            .current_instruction()
            .map(format_instruction)
            .unwrap_or_else(|| "<undefined>".to_string());

        match self.machine.step() {
            Ok(event) => {
                self.status = format!("{}: {}", report::format_event(&event), text);
                if !self.machine.is_running() {
                    self.halted_status();
                    self.running = false;
                }
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    fn halted_status(&mut self) {
        if let Some(outcome) = self.machine.outcome() {
            self.status = format!(
                "{} at {} after {} steps",
                report::halt_kind(&outcome),
                outcome.final_label(),
                outcome.step_count()
            );
        }
    }

    /// Start continuous execution.
    ///
    /// Resuming from a breakpoint steps past it first.
    pub fn run(&mut self) {
        if self.breakpoints.contains(&self.machine.label) {
            self.step();
        }
        self.running = self.machine.is_running();
        if self.running {
            self.status = "Running...".into();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.machine.is_running() {
            self.running = false;
            self.halted_status();
            return;
        }

        if self.breakpoints.contains(&self.machine.label) {
            self.running = false;
            self.status = format!("Breakpoint at {}", self.machine.label);
            return;
        }

        self.step();
    }

    /// Run several ticks per frame.
    pub fn tick_batch(&mut self, ticks: usize) {
        for _ in 0..ticks {
            if !self.running {
                break;
            }
            self.tick();
        }
    }

    /// Toggle breakpoint at the current label.
    pub fn toggle_breakpoint(&mut self) {
        let label = self.machine.label.clone();
        if self.breakpoints.remove(&label) {
            self.status = format!("Removed breakpoint at {}", label);
        } else {
            self.status = format!("Set breakpoint at {}", label);
            self.breakpoints.insert(label);
        }
    }

    /// Reset the machine to its starting configuration.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Program listing: `(label, instruction text, is_current)`.
    pub fn get_listing(&self) -> Vec<(Label, String, bool)> {
        self.machine
            .program()
            .iter()
            .map(|(label, instr)| {
                (label.clone(), format_instruction(instr), *label == self.machine.label)
            })
            .collect()
    }
}

/// Run the debugger on a loaded program.
pub fn run_debugger(loaded: LoadedProgram) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(loaded);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => {
                            app.reg_scroll = app.reg_scroll.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            if app.reg_scroll + 1 < app.machine.registers.len() {
                                app.reg_scroll += 1;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick_batch(TICKS_PER_FRAME);
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

const TICKS_PER_FRAME: usize = 64;
