//! CPU execution engine.
//!
//! Applies decoded instructions to processor state. Dispatch is by format,
//! then by operation code. Each handler only computes a `(destination,
//! value)` pair; the single write-back at the end is where `$zero` writes
//! are dropped and where state is committed, so a failed instruction never
//! leaves a partial effect behind.

use crate::cpu::{Memory, Registers};
use crate::cpu::decode::{Format, Funct, Instruction, Opcode};
use crate::cpu::memory::DEFAULT_MEMORY_SIZE;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The MIPS CPU state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    /// General-purpose registers plus HI/LO.
    pub regs: Registers,
    /// Program counter, as an index into the loaded program.
    pub pc: u32,
    /// Main memory.
    pub mem: Memory,
}

impl Cpu {
    /// Create a new CPU with zeroed state and 1 MiB of memory.
    pub fn new() -> Self {
        Self::with_memory_size(DEFAULT_MEMORY_SIZE)
    }

    /// Create a new CPU with `bytes` of zeroed memory.
    pub fn with_memory_size(bytes: usize) -> Self {
        Self {
            regs: Registers::new(),
            pc: 0,
            mem: Memory::with_size(bytes),
        }
    }

    /// Reset registers, HI/LO, PC and memory to zero.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.pc = 0;
        self.mem.clear();
    }

    /// Execute a decoded instruction.
    ///
    /// The program counter is left alone; advancing it is the caller's job.
    pub fn execute(&mut self, instr: &Instruction) -> Result<(), ExecuteError> {
        let (dest, value) = match *instr {
            Instruction::R(r) => {
                let rs = self.regs.read(r.rs);
                let rt = self.regs.read(r.rt);
                let value = match r.funct {
                    Funct::ADD => rs.wrapping_add(rt),
                    Funct::SUB => rs.wrapping_sub(rt),
                    funct => return Err(unsupported(Format::Register, funct)),
                };
                (r.rd, value)
            }

            Instruction::I(i) => {
                let rs = self.regs.read(i.rs);
                let value = match i.opcode {
                    Opcode::ADDI => rs.wrapping_add(i32::from(i.immediate)),
                    opcode => return Err(unsupported(Format::Immediate, opcode)),
                };
                (i.rt, value)
            }

            Instruction::J(j) => return Err(unsupported(Format::Jump, j.opcode)),
        };

        self.write_back(dest, value);
        Ok(())
    }

    /// Commit a result. Writes to `$zero` vanish here.
    fn write_back(&mut self, dest: Reg, value: i32) {
        self.regs.write(dest, value);
    }
}

fn unsupported(format: Format, function_code: u8) -> ExecuteError {
    ExecuteError::UnsupportedOperation { format, function_code }
}

/// Execute `instr` against `cpu`. See [`Cpu::execute`].
pub fn execute(instr: &Instruction, cpu: &mut Cpu) -> Result<(), ExecuteError> {
    cpu.execute(instr)
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("pc", &self.pc)
            .field("regs", &self.regs)
            .field("mem", &self.mem)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("unsupported operation: {format} code {function_code:#04x}")]
    UnsupportedOperation { format: Format, function_code: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::{decode, IType, JType, RType};

    fn reg(i: u8) -> Reg {
        Reg::new(i).unwrap()
    }

    fn run(cpu: &mut Cpu, line: &str) {
        let instr = decode(line).unwrap();
        cpu.execute(&instr).unwrap();
    }

    #[test]
    fn test_add() {
        let mut cpu = Cpu::with_memory_size(0);
        cpu.regs.write(reg(17), 5);
        cpu.regs.write(reg(18), 7);
        let before = cpu.regs.clone();

        run(&mut cpu, "add $t0, $s1, $s2");

        assert_eq!(cpu.regs.read(reg(8)), 12);
        for i in (0..32).filter(|&i| i != 8) {
            assert_eq!(cpu.regs.read(reg(i)), before.read(reg(i)), "register {} changed", i);
        }
    }

    #[test]
    fn test_sub() {
        let mut cpu = Cpu::with_memory_size(0);
        cpu.regs.write(reg(8), 3);
        cpu.regs.write(reg(16), 10);

        run(&mut cpu, "sub $t1, $t0, $s0");

        assert_eq!(cpu.regs.read(reg(9)), -7);
    }

    #[test]
    fn test_addi_sign_extends() {
        let mut cpu = Cpu::with_memory_size(0);
        run(&mut cpu, "addi $t0, $zero, -3");
        assert_eq!(cpu.regs.read(reg(8)), -3);

        run(&mut cpu, "addi $t0, $t0, 10");
        assert_eq!(cpu.regs.read(reg(8)), 7);
    }

    #[test]
    fn test_wrapping() {
        let mut cpu = Cpu::with_memory_size(0);
        cpu.regs.write(reg(8), i32::MAX);
        cpu.regs.write(reg(9), 1);
        run(&mut cpu, "add $t2, $t0, $t1");
        assert_eq!(cpu.regs.read(reg(10)), i32::MIN);

        run(&mut cpu, "sub $t3, $t2, $t1");
        assert_eq!(cpu.regs.read(reg(11)), i32::MAX);

        run(&mut cpu, "addi $t4, $t0, 1");
        assert_eq!(cpu.regs.read(reg(12)), i32::MIN);
    }

    #[test]
    fn test_zero_register_is_immutable() {
        let mut cpu = Cpu::with_memory_size(0);
        cpu.regs.write(reg(8), 99);

        run(&mut cpu, "add $zero, $t0, $t0");
        assert_eq!(cpu.regs.read(Reg::ZERO), 0);
        run(&mut cpu, "sub $zero, $zero, $t0");
        assert_eq!(cpu.regs.read(Reg::ZERO), 0);
        run(&mut cpu, "addi $zero, $t0, 1");
        assert_eq!(cpu.regs.read(Reg::ZERO), 0);
    }

    #[test]
    fn test_pc_is_not_advanced() {
        let mut cpu = Cpu::with_memory_size(0);
        run(&mut cpu, "addi $t0, $zero, 1");
        assert_eq!(cpu.pc, 0);
    }

    #[test]
    fn test_unsupported_operations_leave_state_unchanged() {
        let mut cpu = Cpu::with_memory_size(16);
        cpu.regs.write(reg(8), 1);
        let before = cpu.clone();

        let cases = [
            (
                Instruction::R(RType { rs: reg(8), rt: reg(8), rd: reg(9), shamt: 0, funct: 0x18 }),
                Format::Register,
                0x18,
            ),
            (
                Instruction::I(IType { opcode: 0x0C, rs: reg(8), rt: reg(9), immediate: 1 }),
                Format::Immediate,
                0x0C,
            ),
            (
                Instruction::J(JType { opcode: 0x02, address: 0x40 }),
                Format::Jump,
                0x02,
            ),
        ];

        for (instr, format, function_code) in cases {
            assert_eq!(
                execute(&instr, &mut cpu),
                Err(ExecuteError::UnsupportedOperation { format, function_code })
            );
            assert_eq!(cpu, before);
        }
    }

    #[test]
    fn test_reset() {
        let mut cpu = Cpu::with_memory_size(8);
        run(&mut cpu, "addi $s0, $zero, 5");
        cpu.pc = 3;
        cpu.regs.hi = 1;
        cpu.mem.write_byte(0, 1).unwrap();

        cpu.reset();

        assert_eq!(cpu, Cpu::with_memory_size(8));
    }

    #[test]
    fn test_default_cpu() {
        let cpu = Cpu::new();
        assert_eq!(cpu.mem.size(), 1024 * 1024);
        assert!(cpu.regs.as_array().iter().all(|&v| v == 0));
        assert_eq!((cpu.regs.hi, cpu.regs.lo), (0, 0));
    }

    #[test]
    fn test_deserialized_cpu_keeps_zero_register() {
        let mut cpu = Cpu::with_memory_size(4);
        run(&mut cpu, "addi $t0, $zero, 7");

        let mut json = serde_json::to_value(&cpu).unwrap();
        let restored: Cpu = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, cpu);

        json["regs"]["gpr"][0] = serde_json::json!(5);
        assert!(serde_json::from_value::<Cpu>(json).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = unsupported(Format::Register, 0x18);
        assert_eq!(err.to_string(), "unsupported operation: R-type code 0x18");
    }
}
