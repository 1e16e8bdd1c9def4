//! Kal error reporting — pretty, coloured diagnostics.

use std::fmt;

/// The phase of compilation where an error occurred.
#[derive(Debug, Clone, Copy)]
pub enum Phase {
    Lexer,
    Parser,
    Codegen,
    Jit,
    Driver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexer   => write!(f, "lex"),
            Phase::Parser  => write!(f, "parse"),
            Phase::Codegen => write!(f, "codegen"),
            Phase::Jit     => write!(f, "jit"),
            Phase::Driver  => write!(f, "driver"),
        }
    }
}

/// A structured compiler error.
#[derive(Debug, Clone)]
pub struct KalError {
    pub phase: Phase,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for KalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for KalError {}

/// Print an error to stderr with red colouring (ANSI).
pub fn report(err: &KalError) {
    // Red bold: \x1b[1;31m   Reset: \x1b[0m
    eprintln!(
        "\x1b[1;31merror\x1b[0m\x1b[1m[{}]:\x1b[0m {}",
        err.phase, err.message,
    );
    if let Some(hint) = &err.hint {
        eprintln!("  \x1b[1;36mhint:\x1b[0m {hint}");
    }
}

/// Report a recoverable error without a hint.
pub fn error(phase: Phase, message: impl Into<String>) {
    report(&KalError { phase, message: message.into(), hint: None });
}

/// Report a recoverable error with a hint.
pub fn error_with_hint(phase: Phase, message: impl Into<String>, hint: impl Into<String>) {
    report(&KalError { phase, message: message.into(), hint: Some(hint.into()) });
}

/// Shorthand — build an error, print it red, and exit.
pub fn fatal(phase: Phase, message: impl Into<String>) -> ! {
    fatal_with_hint(phase, message, None)
}

/// Shorthand — build an error with a hint, print it red, and exit.
pub fn fatal_with_hint(phase: Phase, message: impl Into<String>, hint: Option<String>) -> ! {
    let err = KalError {
        phase,
        message: message.into(),
        hint,
    };
    report(&err);
    std::process::exit(1);
}

/// Print a status/info message with a coloured `[kal]` prefix.
pub fn info(message: impl std::fmt::Display) {
    eprintln!("\x1b[1;34m[kal]\x1b[0m {message}");
}
