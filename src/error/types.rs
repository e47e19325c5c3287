//! Error types
//!
//! Defines the closed set of recoverable protocol errors and the wrapper
//! separating them from fatal I/O failures.

use std::fmt;
use std::io;

/// Recoverable command errors.
///
/// Each variant is translated by the dispatcher into exactly one control
/// connection reply; none of them propagate past dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Malformed command or missing required parameter.
    Syntax,
    /// A session precondition is unmet (e.g. a required attribute is absent).
    IllegalState(String),
    /// The operation requires an authenticated session and none exists.
    NotLoggedIn,
    /// A supplied path fails filesystem naming rules.
    InvalidFilename(String),
    /// Any other filesystem-layer failure, carrying the catalog message key
    /// and the offending path.
    FileSystem {
        message_key: &'static str,
        path: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Syntax => write!(f, "Command syntax error"),
            CommandError::IllegalState(msg) => write!(f, "Illegal state: {}", msg),
            CommandError::NotLoggedIn => write!(f, "Not logged in"),
            CommandError::InvalidFilename(path) => write!(f, "Invalid filename: {}", path),
            CommandError::FileSystem { message_key, path } => {
                write!(f, "File system error [{}]: {}", message_key, path)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Error returned by a command handler.
///
/// `Command` variants are recoverable and become protocol replies; `Io`
/// variants are fatal to the session and propagate untranslated.
#[derive(Debug)]
pub enum HandlerError {
    Command(CommandError),
    Io(io::Error),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Command(e) => write!(f, "Command error: {}", e),
            HandlerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<CommandError> for HandlerError {
    fn from(error: CommandError) -> Self {
        HandlerError::Command(error)
    }
}

impl From<io::Error> for HandlerError {
    fn from(error: io::Error) -> Self {
        HandlerError::Io(error)
    }
}
