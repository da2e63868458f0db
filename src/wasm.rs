//! WebAssembly bindings for the counter machine.
//!
//! This module provides JavaScript-friendly wrappers around the core machine.

use wasm_bindgen::prelude::*;
use crate::asm::{format_program, load, listing::format_instruction};
use crate::machine::{Machine, NoTrace};
use crate::report;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly machine wrapper.
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Option<Machine>,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create an empty wrapper; call `load` before stepping.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { machine: None }
    }

    /// Load a program from source text. Returns the instruction count.
    #[wasm_bindgen]
    pub fn load(&mut self, source: &str) -> Result<usize, JsError> {
        let loaded = load(source).map_err(|e| JsError::new(&e.to_string()))?;
        let len = loaded.program.len();
        self.machine = Some(loaded.machine());
        Ok(len)
    }

    fn machine_mut(&mut self) -> Result<&mut Machine, JsError> {
        self.machine.as_mut().ok_or_else(|| JsError::new("no program loaded"))
    }

    /// Step one instruction. Returns the trace record of that step.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let machine = self.machine_mut()?;
        let event = machine.step().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(report::format_event(&event))
    }

    /// Run until halt or `max_steps`. Returns the total step count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_steps: u32) -> Result<u64, JsError> {
        let machine = self.machine_mut()?;
        if machine.is_running() {
            machine
                .run_limited(max_steps as u64, NoTrace)
                .map_err(|e| JsError::new(&e.to_string()))?;
        }
        Ok(machine.steps)
    }

    /// Reset to the starting configuration.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        if let Some(machine) = self.machine.as_mut() {
            machine.reset();
        }
    }

    /// Check if the machine is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.machine.as_ref().is_some_and(Machine::is_running)
    }

    /// Current label.
    #[wasm_bindgen]
    pub fn label(&self) -> String {
        self.machine.as_ref().map(|m| m.label.to_string()).unwrap_or_default()
    }

    /// Step count so far.
    #[wasm_bindgen]
    pub fn steps(&self) -> u64 {
        self.machine.as_ref().map_or(0, |m| m.steps)
    }

    /// Run state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.machine.as_ref().map(|m| format!("{:?}", m.state)).unwrap_or_default()
    }

    /// Register values as decimal strings.
    #[wasm_bindgen]
    pub fn registers(&self) -> Vec<String> {
        self.machine
            .as_ref()
            .map(|m| m.registers.as_slice().iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Full machine state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.machine.as_ref().map(|m| m.snapshot()))
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Instruction at the current label, or an empty string if undefined.
    #[wasm_bindgen]
    pub fn current_instruction(&self) -> String {
        self.machine
            .as_ref()
            .and_then(|m| m.current_instruction())
            .map(format_instruction)
            .unwrap_or_default()
    }
}

impl Default for WasmMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Check program source. Returns the instruction count.
#[wasm_bindgen]
pub fn wasm_check(source: &str) -> Result<usize, JsError> {
    let loaded = load(source).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(loaded.program.len())
}

/// Format program source canonically.
#[wasm_bindgen]
pub fn wasm_format(source: &str) -> Result<String, JsError> {
    let loaded = load(source).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(format_program(&loaded))
}
