//! MIPS CPU model.
//!
//! - 32 general-purpose 32-bit registers (`$zero` hard-wired to 0)
//! - HI/LO pair, program counter, 1 MiB byte-addressable memory
//! - Text decoder for `add`, `sub` and `addi`, and the execution unit

pub mod memory;
pub mod registers;
pub mod resolve;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Reg, Registers};
pub use resolve::{resolve_register, RegisterFault};
pub use decode::{decode, DecodeError, Format, Funct, IType, Instruction, JType, Mnemonic, Opcode, RType};
pub use execute::{execute, Cpu, ExecuteError};
