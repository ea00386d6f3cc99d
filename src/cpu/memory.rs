//! Simulated main memory.
//!
//! A flat, zero-filled byte buffer addressed by 32-bit offsets. No in-scope
//! instruction touches it yet; the accessors are bounds- and
//! alignment-checked so load/store can be layered on top.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Default memory size: 1 MiB.
pub const DEFAULT_MEMORY_SIZE: usize = 1024 * 1024;

/// Byte-addressable memory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Create a zeroed memory of the default size.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_MEMORY_SIZE)
    }

    /// Create a zeroed memory of `size` bytes.
    pub fn with_size(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Read one byte.
    pub fn read_byte(&self, addr: u32) -> Result<u8, MemoryError> {
        let index = self.check(addr, 1)?;
        Ok(self.bytes[index])
    }

    /// Write one byte.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), MemoryError> {
        let index = self.check(addr, 1)?;
        self.bytes[index] = value;
        Ok(())
    }

    /// Read a big-endian word. The address must be 4-byte aligned.
    pub fn read_word(&self, addr: u32) -> Result<u32, MemoryError> {
        if addr % 4 != 0 {
            return Err(MemoryError::Misaligned { addr });
        }
        let index = self.check(addr, 4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[index..index + 4]);
        Ok(u32::from_be_bytes(word))
    }

    /// Write a big-endian word. The address must be 4-byte aligned.
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), MemoryError> {
        if addr % 4 != 0 {
            return Err(MemoryError::Misaligned { addr });
        }
        let index = self.check(addr, 4)?;
        self.bytes[index..index + 4].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn check(&self, addr: u32, width: usize) -> Result<usize, MemoryError> {
        let index = addr as usize;
        match index.checked_add(width) {
            Some(end) if end <= self.bytes.len() => Ok(index),
            _ => Err(MemoryError::AddressOutOfRange {
                addr,
                size: self.bytes.len(),
            }),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only summarise; dumping a megabyte is useless
        let non_zero = self.bytes.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_bytes", &non_zero)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Errors that can occur during memory access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {addr:#010x} out of range (size {size:#x})")]
    AddressOutOfRange { addr: u32, size: usize },

    #[error("misaligned word access at {addr:#010x}")]
    Misaligned { addr: u32 },
}
