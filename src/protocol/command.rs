//! Module `command`
//!
//! Defines the parsed representation of an FTP command and the parsing of
//! raw control-connection lines into it.

use crate::error::CommandError;

/// An FTP command parsed from client input: an uppercase verb plus its
/// parameters.
///
/// Parameters are split on whitespace and commas, so a `PORT` argument of
/// `h1,h2,h3,h4,p1,p2` arrives as six separate parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    parameters: Vec<String>,
}

impl Command {
    pub fn new(name: &str, parameters: Vec<String>) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            parameters,
        }
    }

    /// The command verb, normalized to uppercase.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the parameter at `index` if present.
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }

    /// Returns the parameter at `index`, failing with a syntax error when it
    /// is absent.
    pub fn required_parameter(&self, index: usize) -> Result<&str, CommandError> {
        self.parameter(index).ok_or(CommandError::Syntax)
    }
}

/// Parses a raw command line received from a client into a `Command`.
///
/// The verb is case-insensitive; the remainder of the line is split into
/// parameters on whitespace and commas.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let parameters = parts
        .next()
        .unwrap_or("")
        .split([' ', '\t', ','])
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    Command::new(name, parameters)
}
