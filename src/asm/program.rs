//! Program sources.
//!
//! A program is plain text, one instruction per line:
//! - `#` starts a comment that runs to the end of the line
//! - Blank lines are ignored
//! - Every other line must decode, or the whole program is rejected

use crate::cpu::decode::{decode, DecodeError, Instruction};
use std::path::Path;
use thiserror::Error;

/// One decoded source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramLine {
    /// 1-based line number in the source.
    pub line: usize,
    /// The instruction text, comment and surrounding whitespace removed.
    pub source: String,
    pub instruction: Instruction,
}

/// A decoded program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<ProgramLine>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a program from source text.
    pub fn parse(source: &str) -> Result<Self, ProgramError> {
        let mut program = Program::new();

        for (index, raw) in source.lines().enumerate() {
            let text = strip_comment(raw).trim();
            if text.is_empty() {
                continue;
            }

            let line = index + 1;
            let instruction = decode(text).map_err(|source| ProgramError::Decode { line, source })?;
            program.lines.push(ProgramLine {
                line,
                source: text.to_string(),
                instruction,
            });
        }

        Ok(program)
    }

    /// Decode a program from individual lines, e.g. from an editor buffer.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let source: Vec<String> = lines.into_iter().map(|l| l.as_ref().to_string()).collect();
        Self::parse(&source.join("\n"))
    }

    /// Decode a program from host values where `None` marks an entry that
    /// is not text. Any such entry rejects the whole program.
    pub fn from_text_values<I>(values: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let lines = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| value.ok_or(ProgramError::NotText { line: index + 1 }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_lines(lines)
    }

    /// The decoded lines.
    pub fn lines(&self) -> &[ProgramLine] {
        &self.lines
    }

    /// The instructions in program order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.lines.iter().map(|l| l.instruction).collect()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl FromIterator<Instruction> for Program {
    /// Build a program from already-decoded instructions; their source text
    /// is the disassembly.
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        let lines = iter
            .into_iter()
            .enumerate()
            .map(|(index, instruction)| ProgramLine {
                line: index + 1,
                source: instruction.to_string(),
                instruction,
            })
            .collect();
        Program { lines }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Load and decode a program file.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Program, ProgramError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ProgramError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
    Program::parse(&source)
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("line {line}: {source}")]
    Decode { line: usize, source: DecodeError },

    #[error("line {line} is not text")]
    NotText { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program() {
        let source = r#"
            # Compute 5 + 7 into $t0
            addi $s1, $zero, 5
            addi $s2, $zero, 7   # inline comment

            add $t0, $s1, $s2
        "#;

        let program = Program::parse(source).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.lines()[1].source, "addi $s2, $zero, 7");
        assert_eq!(program.lines()[2].line, 6);
    }

    #[test]
    fn test_error_reports_line() {
        let source = "addi $t0, $zero, 1\n\nmul $t0, $t0, $t0\n";
        assert_eq!(
            Program::parse(source),
            Err(ProgramError::Decode {
                line: 3,
                source: DecodeError::UnsupportedInstruction { mnemonic: "mul".into() },
            })
        );
    }

    #[test]
    fn test_from_lines() {
        let program = Program::from_lines(["addi $t0, $zero, 1", "", "sub $t1, $t0, $t0"]).unwrap();
        assert_eq!(program.instructions().len(), 2);
    }

    #[test]
    fn test_non_text_value_rejects_program() {
        let values = vec![
            Some("addi $t0, $zero, 1".to_string()),
            None,
            Some("add $t1, $t0, $t0".to_string()),
        ];
        assert_eq!(Program::from_text_values(values), Err(ProgramError::NotText { line: 2 }));

        let values = vec![Some("addi $t0, $zero, 1".to_string()), Some("mul $t0".to_string())];
        assert!(matches!(
            Program::from_text_values(values),
            Err(ProgramError::Decode { line: 2, .. })
        ));

        let program = Program::from_text_values(vec![Some("sub $t1, $t0, $t0".to_string())]).unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_collect_instructions() {
        let program: Program = [decode("sub $t1, $t0, $s0").unwrap()].into_iter().collect();
        assert_eq!(program.lines()[0].line, 1);
        assert_eq!(program.lines()[0].source, "sub $t1, $t0, $s0");
    }

    #[test]
    fn test_empty_source() {
        assert!(Program::parse("\n   \n# nothing\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_program("/nonexistent/program.s").unwrap_err();
        assert!(matches!(err, ProgramError::Io(_)));
    }
}
