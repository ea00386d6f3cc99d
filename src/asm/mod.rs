//! Program text handling.
//!
//! This module provides:
//! - Program loading (multi-line source → decoded instructions)
//! - A disassembler (instructions → readable text and machine words)

pub mod disasm;
pub mod program;

pub use disasm::{disassemble_instruction, listing};
pub use program::{load_program, Program, ProgramError, ProgramLine};
