//! Error types for the nasm-syntax crate.
//!
//! Parsing itself never fails: every input produces a best-effort tree plus
//! zero or more positioned [`Diagnostic`]s. The [`Error`] enum exists for
//! callers that want strict semantics (see [`crate::parse_strict`]) and for
//! configuration misuse.

use crate::token::Location;
use thiserror::Error;

/// Result type used by the strict entry points
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// First syntax diagnostic promoted to a hard error (strict mode)
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// Invalid parser configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A positioned error annotation recorded during parsing.
///
/// Diagnostics never abort the parse; the tree is produced regardless and
/// downstream tools decide how severe a diagnostic is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct Diagnostic {
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl From<Diagnostic> for Error {
    fn from(diagnostic: Diagnostic) -> Self {
        Error::Syntax {
            message: diagnostic.message,
            line: diagnostic.location.line,
            column: diagnostic.location.column,
        }
    }
}
