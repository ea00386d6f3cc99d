//! Register name resolution.
//!
//! Maps register tokens from assembly text (`$zero`, `$t0`..`$t9`,
//! `$s0`..`$s7`) to register indices. The numbering follows fixed bases:
//!
//! | class | names      | indices |
//! |-------|------------|---------|
//! | zero  | `zero`     | 0       |
//! | temp  | `t0`..`t9` | 8..=17  |
//! | saved | `s0`..`s7` | 16..=23 |

use crate::cpu::registers::Reg;
use crate::cpu::decode::DecodeError;
use thiserror::Error;

/// A numbered register class: `<prefix><n>` maps to `base + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RegisterClass {
    prefix: char,
    base: u8,
    max: u8,
}

const CLASSES: [RegisterClass; 2] = [
    RegisterClass { prefix: 't', base: 8, max: 9 },
    RegisterClass { prefix: 's', base: 16, max: 7 },
];

/// Why a register token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterFault {
    #[error("unknown register class")]
    UnknownClass,

    #[error("invalid {class}-register number")]
    NonNumericSuffix { class: char },

    #[error("{class}-register must be 0-{max}")]
    OutOfRange { class: char, max: u8 },
}

/// Resolve a register token to its index.
///
/// One leading `$` and one trailing `,` are stripped first; the bare name
/// is accepted too.
pub fn resolve_register(token: &str) -> Result<Reg, DecodeError> {
    classify(token).map_err(|reason| DecodeError::InvalidRegister {
        token: token.to_string(),
        reason,
    })
}

fn classify(token: &str) -> Result<Reg, RegisterFault> {
    let name = token.strip_prefix('$').unwrap_or(token);
    let name = name.strip_suffix(',').unwrap_or(name);

    if name == "zero" {
        return Ok(Reg::ZERO);
    }

    let mut chars = name.chars();
    let prefix = chars.next().ok_or(RegisterFault::UnknownClass)?;
    let class = CLASSES
        .iter()
        .find(|c| c.prefix == prefix)
        .ok_or(RegisterFault::UnknownClass)?;

    let suffix = chars.as_str();
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RegisterFault::NonNumericSuffix { class: class.prefix });
    }

    let out_of_range = RegisterFault::OutOfRange { class: class.prefix, max: class.max };
    // All digits, so the only parse failure left is overflow
    let n: u32 = suffix.parse().map_err(|_| out_of_range)?;
    if n > u32::from(class.max) {
        return Err(out_of_range);
    }

    Reg::new(class.base + n as u8).ok_or(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(token: &str) -> u8 {
        resolve_register(token).unwrap().index()
    }

    fn fault(token: &str) -> RegisterFault {
        match resolve_register(token) {
            Err(DecodeError::InvalidRegister { token: t, reason }) => {
                assert_eq!(t, token);
                reason
            }
            other => panic!("expected InvalidRegister for {:?}, got {:?}", token, other),
        }
    }

    #[test]
    fn test_zero() {
        assert_eq!(index("$zero"), 0);
        assert_eq!(index("$zero,"), 0);
        assert_eq!(index("zero"), 0);
    }

    #[test]
    fn test_temporaries() {
        for n in 0..=9u8 {
            assert_eq!(index(&format!("$t{}", n)), 8 + n);
            assert_eq!(index(&format!("$t{},", n)), 8 + n);
        }
    }

    #[test]
    fn test_saved() {
        for n in 0..=7u8 {
            assert_eq!(index(&format!("$s{}", n)), 16 + n);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(fault("$t10"), RegisterFault::OutOfRange { class: 't', max: 9 });
        assert_eq!(fault("$s8"), RegisterFault::OutOfRange { class: 's', max: 7 });
        assert_eq!(
            fault("$t99999999999999999999"),
            RegisterFault::OutOfRange { class: 't', max: 9 }
        );
    }

    #[test]
    fn test_non_numeric_suffix() {
        assert_eq!(fault("$tx"), RegisterFault::NonNumericSuffix { class: 't' });
        assert_eq!(fault("$s"), RegisterFault::NonNumericSuffix { class: 's' });
        assert_eq!(fault("$t-1"), RegisterFault::NonNumericSuffix { class: 't' });
        assert_eq!(fault("$t+1"), RegisterFault::NonNumericSuffix { class: 't' });
    }

    #[test]
    fn test_unknown_class() {
        assert_eq!(fault("$x0"), RegisterFault::UnknownClass);
        assert_eq!(fault("$"), RegisterFault::UnknownClass);
        assert_eq!(fault(""), RegisterFault::UnknownClass);
        assert_eq!(fault("$ra"), RegisterFault::UnknownClass);
    }

    #[test]
    fn test_malformed_sigils() {
        assert_eq!(fault("$$t0"), RegisterFault::UnknownClass);
        assert_eq!(fault("%t0"), RegisterFault::UnknownClass);
        assert_eq!(fault("$t0,,"), RegisterFault::NonNumericSuffix { class: 't' });
    }
}
