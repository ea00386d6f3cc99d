//! Instruction representation and the text decoder.
//!
//! MIPS instructions come in three formats. Each variant of [`Instruction`]
//! carries only the fields its format defines:
//!
//! ```text
//! R:  opcode(6) | rs(5) | rt(5) | rd(5) | shamt(5) | funct(6)
//! I:  opcode(6) | rs(5) | rt(5) | immediate(16)
//! J:  opcode(6) | address(26)
//! ```
//!
//! The decoder accepts one line of assembly text:
//!
//! ```text
//! add  $rd, $rs, $rt
//! sub  $rd, $rs, $rt
//! addi $rt, $rs, immediate
//! ```

use crate::cpu::registers::Reg;
use crate::cpu::resolve::{resolve_register, RegisterFault};
use serde::{Serialize, Deserialize};
use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Instruction format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// Three register operands.
    Register,
    /// Two registers and a 16-bit literal.
    Immediate,
    /// A 26-bit jump target.
    Jump,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Register => "R-type",
            Format::Immediate => "I-type",
            Format::Jump => "J-type",
        };
        f.write_str(name)
    }
}

/// Primary opcode values.
#[derive(Debug, Clone, Copy)]
pub struct Opcode;

impl Opcode {
    /// All R-type instructions share opcode 0 and are told apart by `funct`.
    pub const SPECIAL: u8 = 0x00;
    pub const ADDI: u8 = 0x08;
}

/// R-type function codes.
#[derive(Debug, Clone, Copy)]
pub struct Funct;

impl Funct {
    pub const ADD: u8 = 0x20;
    pub const SUB: u8 = 0x22;
}

/// Register-format fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RType {
    pub rs: Reg,
    pub rt: Reg,
    pub rd: Reg,
    pub shamt: u8,
    pub funct: u8,
}

/// Immediate-format fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IType {
    pub opcode: u8,
    pub rs: Reg,
    pub rt: Reg,
    pub immediate: i16,
}

/// Jump-format fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JType {
    pub opcode: u8,
    /// 26-bit word target.
    pub address: u32,
}

/// A decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    R(RType),
    I(IType),
    J(JType),
}

impl Instruction {
    /// The format tag of this instruction.
    pub fn format(&self) -> Format {
        match self {
            Instruction::R(_) => Format::Register,
            Instruction::I(_) => Format::Immediate,
            Instruction::J(_) => Format::Jump,
        }
    }

    /// The code that selects the operation within its format: `funct` for
    /// R-type, the primary opcode otherwise.
    pub fn operation_code(&self) -> u8 {
        match self {
            Instruction::R(r) => r.funct,
            Instruction::I(i) => i.opcode,
            Instruction::J(j) => j.opcode,
        }
    }

    /// Encode to a 32-bit machine word.
    pub fn encode(&self) -> u32 {
        let reg = |r: Reg| u32::from(r.index());
        match *self {
            Instruction::R(r) => {
                (u32::from(Opcode::SPECIAL) << 26)
                    | reg(r.rs) << 21
                    | reg(r.rt) << 16
                    | reg(r.rd) << 11
                    | (u32::from(r.shamt) & 0x1F) << 6
                    | (u32::from(r.funct) & 0x3F)
            }
            Instruction::I(i) => {
                (u32::from(i.opcode) & 0x3F) << 26
                    | reg(i.rs) << 21
                    | reg(i.rt) << 16
                    | u32::from(i.immediate as u16)
            }
            Instruction::J(j) => (u32::from(j.opcode) & 0x3F) << 26 | (j.address & 0x03FF_FFFF),
        }
    }
}

/// The supported mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Add,
    Sub,
    Addi,
}

impl Mnemonic {
    /// Look up a mnemonic by its exact (lowercase) text.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "add" => Some(Mnemonic::Add),
            "sub" => Some(Mnemonic::Sub),
            "addi" => Some(Mnemonic::Addi),
            _ => None,
        }
    }

    /// The assembly text for this mnemonic.
    pub fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Sub => "sub",
            Mnemonic::Addi => "addi",
        }
    }

    /// Format produced for this mnemonic.
    pub fn format(self) -> Format {
        match self {
            Mnemonic::Add | Mnemonic::Sub => Format::Register,
            Mnemonic::Addi => Format::Immediate,
        }
    }

    /// Operation code within the format (`funct` or primary opcode).
    pub fn code(self) -> u8 {
        match self {
            Mnemonic::Add => Funct::ADD,
            Mnemonic::Sub => Funct::SUB,
            Mnemonic::Addi => Opcode::ADDI,
        }
    }

    /// Reverse lookup from a format and operation code.
    pub fn from_code(format: Format, code: u8) -> Option<Self> {
        match (format, code) {
            (Format::Register, Funct::ADD) => Some(Mnemonic::Add),
            (Format::Register, Funct::SUB) => Some(Mnemonic::Sub),
            (Format::Immediate, Opcode::ADDI) => Some(Mnemonic::Addi),
            _ => None,
        }
    }
}

/// Every supported mnemonic takes three operands.
const OPERAND_TOKENS: usize = 4;

/// Decode one line of assembly text.
pub fn decode(line: &str) -> Result<Instruction, DecodeError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let op = *parts.first().ok_or(DecodeError::EmptyInstruction)?;
    let mnemonic = Mnemonic::parse(op).ok_or_else(|| DecodeError::UnsupportedInstruction {
        mnemonic: op.to_string(),
    })?;

    if parts.len() != OPERAND_TOKENS {
        return Err(DecodeError::ArityMismatch {
            mnemonic: op.to_string(),
            expected: OPERAND_TOKENS,
            got: parts.len(),
        });
    }

    match mnemonic {
        Mnemonic::Add | Mnemonic::Sub => {
            // add $rd, $rs, $rt
            let rd = resolve_register(parts[1])?;
            let rs = resolve_register(parts[2])?;
            let rt = resolve_register(parts[3])?;
            Ok(Instruction::R(RType { rs, rt, rd, shamt: 0, funct: mnemonic.code() }))
        }
        Mnemonic::Addi => {
            // addi $rt, $rs, imm
            let rt = resolve_register(parts[1])?;
            let rs = resolve_register(parts[2])?;
            let immediate = parse_immediate(parts[3])?;
            Ok(Instruction::I(IType { opcode: mnemonic.code(), rs, rt, immediate }))
        }
    }
}

fn parse_immediate(token: &str) -> Result<i16, DecodeError> {
    token.parse::<i16>().map_err(|source| DecodeError::ImmediateParseError {
        token: token.to_string(),
        source,
    })
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty instruction")]
    EmptyInstruction,

    #[error("unsupported instruction: {mnemonic}")]
    UnsupportedInstruction { mnemonic: String },

    #[error("instruction error '{mnemonic}': expected {expected} parts, got {got}")]
    ArityMismatch { mnemonic: String, expected: usize, got: usize },

    #[error("register error '{token}': {reason}")]
    InvalidRegister { token: String, reason: RegisterFault },

    #[error("failed to parse immediate value '{token}': {source}")]
    ImmediateParseError { token: String, source: ParseIntError },
}
