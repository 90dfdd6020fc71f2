//! Error types for tree assembly and matching
//!
//! Two kinds of errors exist and they are never mixed:
//!
//! - [`ParseError`] is recoverable. It is what a value parser returns when user input does not
//!   fit, and the engine turns it into a [`ParseFailure`](super::result::ParseFailure) entry.
//! - [`SetupError`] is fatal. It signals a programming mistake (ambiguous executables, a parser
//!   breaking the cursor contract, a malformed usage string) and aborts assembly or the parse
//!   call that hit it.
//!
//! Errors raised by executables are not modelled here: an executable returns whatever `T` the
//! caller chose, `Result` included, and the engine hands it back untouched.

use thiserror::Error;

/// A value parser rejected the input at the cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fatal errors raised while assembling a tree or by a misbehaving parser
#[derive(Debug, Clone, Error)]
pub enum SetupError {
    #[error("Ambiguous command executable at {node}!")]
    AmbiguousExecutable { node: String },

    #[error("The argument parser '{parser}' of argument '{argument}' altered the cursor in an illegal way. (position changed backwards)")]
    CursorMovedBackwards { parser: String, argument: String },

    #[error("The argument parser '{parser}' of argument '{argument}' did not consume the full token. (expected next char to be a space or end of string)")]
    PartialToken { parser: String, argument: String },

    #[error("Invalid usage '{usage}': {reason}")]
    InvalidUsage { usage: String, reason: String },

    #[error("No argument parser registered for '{name}'")]
    UnknownParser { name: String },

    #[error("Invalid argument pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("{source}\nUsage: {usage}")]
    InUsage {
        usage: String,
        #[source]
        source: Box<SetupError>,
    },
}

impl SetupError {
    /// Attach the usage string that was being registered when the error happened
    pub fn in_usage(self, usage: impl Into<String>) -> Self {
        SetupError::InUsage {
            usage: usage.into(),
            source: Box::new(self),
        }
    }
}
