//! Disassembler.
//!
//! Renders decoded instructions back to assembly text using the canonical
//! ABI register names.

use crate::cpu::decode::{Instruction, Mnemonic};
use std::fmt;

/// Disassemble a single instruction to text.
pub fn disassemble_instruction(instr: &Instruction) -> String {
    instr.to_string()
}

/// Disassemble a slice of instructions into an address / word / text listing.
pub fn listing(instructions: &[Instruction]) -> String {
    let mut output = String::new();
    output.push_str("# MIPS Disassembly\n");
    output.push_str("# -----------------\n\n");

    for (addr, instr) in instructions.iter().enumerate() {
        output.push_str(&format!("{:04}: {:08x}  {}\n", addr, instr.encode(), instr));
    }

    output
}

/// Registers print under their ABI names. The decoder only knows `$zero`,
/// `$t0`-`$t9` and `$s0`-`$s7`, and resolves `$t8`/`$t9` to 16/17, so text
/// for registers outside `$t0`-`$t7`, `$s0`-`$s7` and `$zero` does not
/// decode back to the same instruction.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(mnemonic) = Mnemonic::from_code(self.format(), self.operation_code()) else {
            return write!(f, "??? # {:#010x}", self.encode());
        };

        match self {
            Instruction::R(r) => write!(f, "{} {}, {}, {}", mnemonic.as_str(), r.rd, r.rs, r.rt),
            Instruction::I(i) => write!(f, "{} {}, {}, {}", mnemonic.as_str(), i.rt, i.rs, i.immediate),
            Instruction::J(j) => write!(f, "{} {:#x}", mnemonic.as_str(), j.address),
        }
    }
}
