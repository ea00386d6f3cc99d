//! MIPS general-purpose register file.
//!
//! The CPU has 32 registers of 32 bits each. Register 0 (`$zero`) is
//! hard-wired to zero: it always reads as 0 and writes to it are discarded.

use serde::{Serialize, Deserialize};
use std::fmt;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Canonical ABI names, indexed by register number.
pub const ABI_NAMES: [&str; REGISTER_COUNT] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3",
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7",
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7",
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra",
];

/// A register index, guaranteed to be in `0..32`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Reg(u8);

impl Reg {
    /// The hard-wired zero register.
    pub const ZERO: Reg = Reg(0);

    /// Create a register index, or `None` if it is not in `0..32`.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Reg(index))
        } else {
            None
        }
    }

    /// Build from the low 5 bits of a value.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Reg((bits & 0x1F) as u8)
    }

    /// The numeric index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Whether this is `$zero`.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The canonical ABI name, without the `$` sigil.
    pub fn name(self) -> &'static str {
        ABI_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for Reg {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Reg::new(index).ok_or_else(|| format!("register index {} out of range (0-31)", index))
    }
}

impl From<Reg> for u8 {
    fn from(reg: Reg) -> u8 {
        reg.0
    }
}

impl fmt::Debug for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}({})", self.name(), self.0)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

/// The register file, plus the HI/LO pair reserved for multiply/divide.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegisters")]
pub struct Registers {
    gpr: [i32; REGISTER_COUNT],

    /// High half of a multiply result / remainder of a divide.
    pub hi: i32,

    /// Low half of a multiply result / quotient of a divide.
    pub lo: i32,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            gpr: [0; REGISTER_COUNT],
            hi: 0,
            lo: 0,
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a general-purpose register.
    #[inline]
    pub fn read(&self, reg: Reg) -> i32 {
        self.gpr[reg.index() as usize]
    }

    /// Write a general-purpose register. Writes to `$zero` are discarded.
    #[inline]
    pub fn write(&mut self, reg: Reg, value: i32) {
        if !reg.is_zero() {
            self.gpr[reg.index() as usize] = value;
        }
    }

    /// All 32 general-purpose registers in index order.
    pub fn as_array(&self) -> &[i32; REGISTER_COUNT] {
        &self.gpr
    }

    /// Iterate over `(register, value)` pairs holding non-zero values.
    pub fn non_zero(&self) -> impl Iterator<Item = (Reg, i32)> + '_ {
        self.gpr
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(i, &v)| (Reg::from_bits(i as u32), v))
    }
}

/// Serialized form of [`Registers`], checked before it is accepted.
#[derive(Deserialize)]
struct RawRegisters {
    gpr: [i32; REGISTER_COUNT],
    hi: i32,
    lo: i32,
}

impl TryFrom<RawRegisters> for Registers {
    type Error = String;

    fn try_from(raw: RawRegisters) -> Result<Self, Self::Error> {
        if raw.gpr[0] != 0 {
            return Err(format!("register $zero must hold 0, found {}", raw.gpr[0]));
        }
        Ok(Self {
            gpr: raw.gpr,
            hi: raw.hi,
            lo: raw.lo,
        })
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (reg, value) in self.non_zero() {
            map.entry(&reg, &value);
        }
        if self.hi != 0 {
            map.entry(&"hi", &self.hi);
        }
        if self.lo != 0 {
            map.entry(&"lo", &self.lo);
        }
        map.finish()
    }
}
