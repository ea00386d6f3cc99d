//! # MIPS Simulator
//!
//! An instruction-level simulator for a small subset of the MIPS32
//! instruction set: `add`, `sub` and `addi` over the `$zero`, `$t*` and
//! `$s*` registers.
//!
//! The core is two functions: [`decode`] turns one line of assembly into an
//! [`Instruction`], and [`execute`] applies it to a [`Cpu`]. [`Simulator`]
//! wraps both into a load / step / inspect loop over a whole program.
//!
//! ```
//! use mips::{decode, Cpu, Reg};
//!
//! let mut cpu = Cpu::new();
//! cpu.execute(&decode("addi $t0, $zero, 40").unwrap()).unwrap();
//! cpu.execute(&decode("addi $t1, $t0, 2").unwrap()).unwrap();
//! assert_eq!(cpu.regs.read(Reg::new(9).unwrap()), 42);
//! ```

pub mod cpu;
pub mod asm;
pub mod sim;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{decode, execute, Cpu, DecodeError, ExecuteError, Format, Instruction, Reg, Registers, Memory};
pub use asm::{disassemble_instruction, listing, load_program, Program, ProgramError};
pub use sim::{SimError, Simulator, Snapshot};
