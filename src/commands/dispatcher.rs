//! Module `dispatcher`
//!
//! The uniform command entry point. Every protocol command goes through
//! `dispatch`, which runs the handler's logic and converts any recoverable
//! error into exactly one control-connection reply. Handlers never send
//! replies on their own failure paths.

use std::any::Any;
use std::io;

use log::{info, warn};

use crate::client::session::Session;
use crate::error::{CommandError, HandlerError};
use crate::protocol::command::Command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Protocol-specific logic for one command verb.
///
/// Handlers are registered once, shared across connections, and invoked
/// through `&self`; mutable handler state (invocation logs, configured
/// replies) uses interior locking.
pub trait CommandHandler: Send + Sync {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError>;

    /// Enables typed introspection of registered handlers in tests.
    fn as_any(&self) -> &dyn Any;
}

/// Runs `handler` and translates its recoverable errors into replies.
///
/// The five recoverable error kinds each map to one reply; an I/O error
/// propagates untranslated and ends the session.
pub fn dispatch(
    handler: &dyn CommandHandler,
    command: &Command,
    session: &mut dyn Session,
    config: &ServerConfig,
) -> io::Result<()> {
    match handler.handle(command, session, config) {
        Ok(()) => Ok(()),
        Err(HandlerError::Command(error)) => {
            warn!("Command {} failed: {}", command.name(), error);
            match error {
                CommandError::Syntax => {
                    send_reply(session, config, replies::SYNTAX_ERROR, None, &[])
                }
                CommandError::IllegalState(_) => {
                    send_reply(session, config, replies::BAD_SEQUENCE, None, &[])
                }
                CommandError::NotLoggedIn => {
                    send_reply(session, config, replies::NOT_LOGGED_IN, None, &[])
                }
                CommandError::InvalidFilename(path) => send_reply(
                    session,
                    config,
                    replies::FILENAME_NOT_VALID,
                    None,
                    &[&path],
                ),
                CommandError::FileSystem { message_key, path } => send_reply(
                    session,
                    config,
                    config.file_system_error_reply_code(),
                    Some(message_key),
                    &[&path],
                ),
            }
        }
        Err(HandlerError::Io(error)) => Err(error),
    }
}

/// Resolves reply text through the catalog, logs the reply, and writes it
/// to the control connection.
pub fn send_reply(
    session: &mut dyn Session,
    config: &ServerConfig,
    code: u16,
    message_key: Option<&str>,
    args: &[&str],
) -> io::Result<()> {
    let text = config.reply_catalog().text_for(code, message_key, args);
    info!("Sending reply [{} {}]", code, text);
    session.send_reply(code, &text)
}

/// A configurable reply: a code plus an optional message key or literal
/// text overriding the catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplySpec {
    code: u16,
    message_key: Option<String>,
    text: Option<String>,
}

impl ReplySpec {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            message_key: None,
            text: None,
        }
    }

    pub fn with_message_key(mut self, message_key: &str) -> Self {
        self.message_key = Some(message_key.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn send(
        &self,
        session: &mut dyn Session,
        config: &ServerConfig,
        args: &[&str],
    ) -> io::Result<()> {
        match &self.text {
            Some(text) => {
                info!("Sending reply [{} {}]", self.code, text);
                session.send_reply(self.code, text)
            }
            None => send_reply(session, config, self.code, self.message_key.as_deref(), args),
        }
    }
}
