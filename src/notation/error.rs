//! Compile-time errors.

use std::fmt;

/// What a bad command failed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command matched no rule of the grammar.
    Syntax,
    /// A note run whose tokens do not name pitches and durations.
    Pitch,
}

/// An error produced while compiling notation source.
///
/// Carries the 1-based source line and the offending command text so the
/// report points at what the author wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub line: usize,
    pub command: String,
    pub kind: ErrorKind,
}

impl CompileError {
    pub fn syntax(line: usize, command: impl Into<String>) -> Self {
        Self {
            line,
            command: command.into(),
            kind: ErrorKind::Syntax,
        }
    }

    pub fn pitch(line: usize, command: impl Into<String>) -> Self {
        Self {
            line,
            command: command.into(),
            kind: ErrorKind::Pitch,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Pitch => "malformed pitch",
        };
        write!(f, "{} on line {} near \"{}\"", what, self.line, self.command)
    }
}

impl std::error::Error for CompileError {}
