//! WebAssembly bindings for the simulator.
//!
//! Exposes load / reset / inspect / step to a browser editor. State is
//! handed over as plain JS objects (JSON parsed on the JS side).

use wasm_bindgen::prelude::*;
use crate::asm::program::{Program, ProgramError};
use crate::sim::Simulator;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly simulator wrapper.
#[wasm_bindgen]
pub struct WasmSimulator {
    sim: Simulator,
}

#[wasm_bindgen]
impl WasmSimulator {
    /// Create a new simulator instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            sim: Simulator::new(),
        }
    }

    /// Zero registers, PC and memory. The loaded program is kept.
    #[wasm_bindgen(js_name = resetState)]
    pub fn reset_state(&mut self) -> bool {
        self.sim.reset();
        true
    }

    /// Load a program from an array of source lines.
    ///
    /// Returns `false` (and keeps the previous program) if any entry is not
    /// a string or fails to decode.
    #[wasm_bindgen(js_name = loadProgram)]
    pub fn load_program(&mut self, lines: js_sys::Array) -> bool {
        match program_from_array(&lines) {
            Ok(program) => {
                self.sim.load(program);
                true
            }
            Err(_) => false,
        }
    }

    /// Explain why these lines would fail to load, or `undefined` if they
    /// decode cleanly.
    #[wasm_bindgen(js_name = checkProgram)]
    pub fn check_program(&self, lines: js_sys::Array) -> Option<String> {
        program_from_array(&lines).err().map(|e| e.to_string())
    }

    /// Current state as `{registers, hi, lo, program, currentStep}`, or
    /// `null` if it cannot be serialized.
    #[wasm_bindgen(js_name = inspectSimulator)]
    pub fn inspect(&self) -> JsValue {
        snapshot_value(&self.sim)
    }

    /// Execute one instruction. Returns the new state, or `false` when the
    /// program is finished or the instruction failed.
    #[wasm_bindgen(js_name = simulatorStep)]
    pub fn step(&mut self) -> JsValue {
        match self.sim.step() {
            Ok(_) => snapshot_value(&self.sim),
            Err(_) => JsValue::FALSE,
        }
    }
}

impl Default for WasmSimulator {
    fn default() -> Self {
        Self::new()
    }
}

fn program_from_array(lines: &js_sys::Array) -> Result<Program, ProgramError> {
    Program::from_text_values(lines.iter().map(|v| v.as_string()))
}

fn snapshot_value(sim: &Simulator) -> JsValue {
    serde_json::to_string(&sim.inspect())
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}
