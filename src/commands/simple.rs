//! Module `simple`
//!
//! Single-reply commands: NOOP, QUIT, PWD, SYST, HELP, and the static-reply
//! handler backing the rest of the default command set.

use std::any::Any;

use crate::client::session::Session;
use crate::commands::dispatcher::{CommandHandler, ReplySpec, send_reply};
use crate::commands::invocation::{InvocationLog, InvocationRecord};
use crate::error::{CommandError, HandlerError};
use crate::protocol::command::Command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Handles NOOP: acknowledges with 200 and touches no state.
#[derive(Debug, Default)]
pub struct NoopCommandHandler {
    invocations: InvocationLog,
}

impl NoopCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl CommandHandler for NoopCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        self.invocations.append(InvocationRecord::new(command.name()));
        send_reply(session, config, replies::OK, None, &[])?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles QUIT: says goodbye and marks the session closed.
#[derive(Debug, Default)]
pub struct QuitCommandHandler;

impl QuitCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for QuitCommandHandler {
    fn handle(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        send_reply(session, config, replies::CLOSING_CONNECTION, None, &[])?;
        session.close();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles PWD and XPWD: reports the session's current directory.
#[derive(Debug, Default)]
pub struct PwdCommandHandler;

impl PwdCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for PwdCommandHandler {
    fn handle(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        let directory = session
            .current_directory()
            .map(str::to_string)
            .ok_or_else(|| {
                CommandError::IllegalState("required current directory is missing".to_string())
            })?;
        send_reply(
            session,
            config,
            replies::PATHNAME_CREATED,
            Some("pwd"),
            &[&directory],
        )?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles SYST: reports the configured system name.
#[derive(Debug, Default)]
pub struct SystCommandHandler;

impl SystCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for SystCommandHandler {
    fn handle(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        send_reply(
            session,
            config,
            replies::SYSTEM_TYPE,
            None,
            &[config.system_name()],
        )?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles HELP: looks up configured help text by the joined parameters
/// (the empty string keys the general help text).
#[derive(Debug, Default)]
pub struct HelpCommandHandler;

impl HelpCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for HelpCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        let name = command.parameters().join(" ");
        match config.help_text(&name) {
            Some(text) => {
                send_reply(session, config, replies::HELP_OK, Some("help"), &[text])?;
            }
            None => {
                send_reply(
                    session,
                    config,
                    replies::HELP_OK,
                    Some("help.noHelpTextDefined"),
                    &[&name],
                )?;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sends one configured reply for every invocation; backs the commands
/// without bespoke behavior.
#[derive(Debug)]
pub struct StaticReplyCommandHandler {
    reply: ReplySpec,
    invocations: InvocationLog,
}

impl StaticReplyCommandHandler {
    pub fn new(code: u16) -> Self {
        Self {
            reply: ReplySpec::new(code),
            invocations: InvocationLog::new(),
        }
    }

    pub fn with_reply(reply: ReplySpec) -> Self {
        Self {
            reply,
            invocations: InvocationLog::new(),
        }
    }

    pub fn reply(&self) -> &ReplySpec {
        &self.reply
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl CommandHandler for StaticReplyCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        self.invocations.append(InvocationRecord::new(command.name()));
        self.reply.send(session, config, &[])?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
