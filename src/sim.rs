//! Program-level simulator.
//!
//! Drives the fetch/execute loop over a loaded program: load, reset, single
//! step, run, and state inspection. The simulator takes `&mut self`
//! everywhere; hosts that share one between threads must hold a single lock
//! around each call so that no caller observes half of a step.

use crate::asm::program::{Program, ProgramError};
use crate::cpu::registers::{Reg, REGISTER_COUNT};
use crate::cpu::{Cpu, ExecuteError, Instruction};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, trace};

/// A CPU plus the program it is stepping through.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    cpu: Cpu,
    program: Program,
}

/// A register as reported by [`Simulator::inspect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterValue {
    /// `$`-prefixed ABI name.
    pub name: String,
    pub index: u8,
    pub value: i32,
}

/// Serializable view of the simulator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub registers: Vec<RegisterValue>,
    pub hi: i32,
    pub lo: i32,
    /// The loaded program, disassembled.
    pub program: Vec<String>,
    /// Index of the next instruction to execute.
    pub current_step: u32,
}

impl Simulator {
    /// Create a simulator with an empty program and a zeroed CPU.
    pub fn new() -> Self {
        Self::with_cpu(Cpu::new())
    }

    /// Create a simulator around an existing CPU.
    pub fn with_cpu(cpu: Cpu) -> Self {
        Self {
            cpu,
            program: Program::new(),
        }
    }

    /// The CPU state.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable access to the CPU state.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The loaded program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Zero all registers, the PC and memory. The program stays loaded.
    pub fn reset(&mut self) {
        self.cpu.reset();
        debug!("simulator reset");
    }

    /// Replace the loaded program and rewind the PC. Returns the
    /// instruction count.
    pub fn load(&mut self, program: Program) -> usize {
        self.program = program;
        self.cpu.pc = 0;
        debug!(instructions = self.program.len(), "program loaded");
        self.program.len()
    }

    /// Decode `source` and load it. On error the current program is kept.
    pub fn load_source(&mut self, source: &str) -> Result<usize, SimError> {
        let program = Program::parse(source)?;
        Ok(self.load(program))
    }

    /// Whether the PC has run past the last instruction.
    pub fn is_finished(&self) -> bool {
        self.cpu.pc as usize >= self.program.len()
    }

    /// Execute the instruction at the PC and advance it.
    ///
    /// On failure the PC stays on the faulting instruction.
    pub fn step(&mut self) -> Result<Instruction, SimError> {
        let pc = self.cpu.pc;
        let instr = self
            .program
            .lines()
            .get(pc as usize)
            .map(|l| l.instruction)
            .ok_or(SimError::ProgramFinished { pc, len: self.program.len() })?;

        self.cpu.execute(&instr)?;
        self.cpu.pc += 1;
        trace!(pc, %instr, "step");

        Ok(instr)
    }

    /// Step until the program finishes or `max_steps` have run.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, max_steps: u64) -> Result<u64, SimError> {
        self.run_with(max_steps, |_, _| {})
    }

    /// Like [`Simulator::run`], calling `on_step` with the PC and the
    /// instruction after each one executes.
    pub fn run_with<F>(&mut self, max_steps: u64, mut on_step: F) -> Result<u64, SimError>
    where
        F: FnMut(u32, &Instruction),
    {
        let mut steps = 0;
        while steps < max_steps && !self.is_finished() {
            let pc = self.cpu.pc;
            let instr = self.step()?;
            on_step(pc, &instr);
            steps += 1;
        }
        debug!(steps, pc = self.cpu.pc, "run stopped");
        Ok(steps)
    }

    /// Capture the current state.
    pub fn inspect(&self) -> Snapshot {
        let registers = (0..REGISTER_COUNT as u32)
            .map(Reg::from_bits)
            .map(|reg| RegisterValue {
                name: reg.to_string(),
                index: reg.index(),
                value: self.cpu.regs.read(reg),
            })
            .collect();

        Snapshot {
            registers,
            hi: self.cpu.regs.hi,
            lo: self.cpu.regs.lo,
            program: self.program.lines().iter().map(|l| l.instruction.to_string()).collect(),
            current_step: self.cpu.pc,
        }
    }
}

/// Errors reported by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("program finished: pc {pc} is past the last of {len} instructions")]
    ProgramFinished { pc: u32, len: usize },

    #[error("execution error: {0}")]
    Execute(#[from] ExecuteError),

    #[error("program error: {0}")]
    Program(#[from] ProgramError),
}
