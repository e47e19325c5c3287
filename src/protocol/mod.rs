//! FTP control-connection protocol primitives
//!
//! Command parsing, reply codes, reply formatting, and the reply-text
//! catalog.

pub mod command;
pub mod replies;

pub use command::{Command, parse_command};
pub use replies::{ReplyCatalog, format_reply};
