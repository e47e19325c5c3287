//! Module `transfer`
//!
//! Data-bearing commands. `DataTransferCommand` captures the fixed
//! lifecycle every such command runs through; RETR, STOR, and LIST supply
//! the per-command hooks.

use std::any::Any;
use std::sync::Mutex;

use log::info;

use crate::client::session::Session;
use crate::commands::dispatcher::{CommandHandler, ReplySpec};
use crate::commands::invocation::{
    FILE_CONTENTS_KEY, InvocationLog, InvocationRecord, PATHNAME_KEY,
};
use crate::error::HandlerError;
use crate::protocol::command::Command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Hooks for one data-bearing command.
///
/// `run_data_transfer` drives the fixed sequence around them: before hook,
/// preliminary reply, open data connection, transfer hook, close data
/// connection, final reply, after hook. Any I/O failure aborts the
/// sequence and is fatal to the session; no second reply is sent.
pub trait DataTransferCommand: Send + Sync {
    fn before_transfer(
        &self,
        command: &Command,
        session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let _ = (command, session, record);
        Ok(())
    }

    /// Moves the bytes once the data connection is open.
    fn transfer(
        &self,
        command: &Command,
        session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError>;

    fn after_transfer(
        &self,
        command: &Command,
        session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let _ = (command, session, record);
        Ok(())
    }

    /// Reply sent before the data connection opens.
    fn preliminary_reply(&self) -> ReplySpec {
        ReplySpec::new(replies::TRANSFER_DATA_START)
    }

    /// Reply sent after the data connection closes.
    fn final_reply(&self) -> ReplySpec {
        ReplySpec::new(replies::TRANSFER_COMPLETE)
    }
}

/// Runs the data-transfer sequence, appending the invocation record to
/// `log` whether or not the sequence completes.
pub fn run_data_transfer(
    handler: &dyn DataTransferCommand,
    log: &InvocationLog,
    command: &Command,
    session: &mut dyn Session,
    config: &ServerConfig,
) -> Result<(), HandlerError> {
    let mut record = InvocationRecord::new(command.name());
    let result = run_sequence(handler, command, session, config, &mut record);
    log.append(record);
    result
}

fn run_sequence(
    handler: &dyn DataTransferCommand,
    command: &Command,
    session: &mut dyn Session,
    config: &ServerConfig,
    record: &mut InvocationRecord,
) -> Result<(), HandlerError> {
    handler.before_transfer(command, session, record)?;
    handler.preliminary_reply().send(session, config, &[])?;
    session.open_data_connection()?;
    handler.transfer(command, session, record)?;
    session.close_data_connection()?;
    handler.final_reply().send(session, config, &[])?;
    handler.after_transfer(command, session, record)
}

/// Handles RETR: records the submitted pathname and writes the configured
/// file contents to the data connection.
#[derive(Debug, Default)]
pub struct RetrCommandHandler {
    contents: Mutex<Vec<u8>>,
    preliminary_reply: Mutex<Option<ReplySpec>>,
    final_reply: Mutex<Option<ReplySpec>>,
    invocations: InvocationLog,
}

impl RetrCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bytes served on retrieval; accepts text or raw bytes.
    pub fn set_file_contents(&self, contents: impl Into<Vec<u8>>) {
        *self.contents.lock().unwrap() = contents.into();
    }

    pub fn set_preliminary_reply(&self, spec: ReplySpec) {
        *self.preliminary_reply.lock().unwrap() = Some(spec);
    }

    pub fn set_final_reply(&self, spec: ReplySpec) {
        *self.final_reply.lock().unwrap() = Some(spec);
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl DataTransferCommand for RetrCommandHandler {
    fn before_transfer(
        &self,
        command: &Command,
        _session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let pathname = command.required_parameter(0)?;
        record.set_text(PATHNAME_KEY, pathname);
        Ok(())
    }

    fn transfer(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        _record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let contents = self.contents.lock().unwrap().clone();
        session.send_data(&contents)?;
        info!("Sent {} bytes over the data connection", contents.len());
        Ok(())
    }

    fn preliminary_reply(&self) -> ReplySpec {
        self.preliminary_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ReplySpec::new(replies::TRANSFER_DATA_START))
    }

    fn final_reply(&self) -> ReplySpec {
        self.final_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ReplySpec::new(replies::TRANSFER_COMPLETE))
    }
}

impl CommandHandler for RetrCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        run_data_transfer(self, &self.invocations, command, session, config)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles STOR: records the submitted pathname, reads all bytes from the
/// data connection, and stores them in the invocation record.
#[derive(Debug, Default)]
pub struct StorCommandHandler {
    preliminary_reply: Mutex<Option<ReplySpec>>,
    final_reply: Mutex<Option<ReplySpec>>,
    invocations: InvocationLog,
}

impl StorCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_preliminary_reply(&self, spec: ReplySpec) {
        *self.preliminary_reply.lock().unwrap() = Some(spec);
    }

    pub fn set_final_reply(&self, spec: ReplySpec) {
        *self.final_reply.lock().unwrap() = Some(spec);
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl DataTransferCommand for StorCommandHandler {
    fn before_transfer(
        &self,
        command: &Command,
        _session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let pathname = command.required_parameter(0)?;
        record.set_text(PATHNAME_KEY, pathname);
        Ok(())
    }

    fn transfer(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let data = session.read_data()?;
        info!("Received {} bytes over the data connection", data.len());
        record.set_bytes(FILE_CONTENTS_KEY, data);
        Ok(())
    }

    fn preliminary_reply(&self) -> ReplySpec {
        self.preliminary_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ReplySpec::new(replies::TRANSFER_DATA_START))
    }

    fn final_reply(&self) -> ReplySpec {
        self.final_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| ReplySpec::new(replies::TRANSFER_COMPLETE))
    }
}

impl CommandHandler for StorCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        run_data_transfer(self, &self.invocations, command, session, config)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles LIST and NLST: sends the configured directory listing over the
/// data connection. A pathname parameter is optional and recorded when
/// present.
#[derive(Debug, Default)]
pub struct ListCommandHandler {
    listing: Mutex<String>,
    invocations: InvocationLog,
}

impl ListCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_directory_listing(&self, listing: &str) {
        *self.listing.lock().unwrap() = listing.to_string();
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl DataTransferCommand for ListCommandHandler {
    fn before_transfer(
        &self,
        command: &Command,
        _session: &mut dyn Session,
        record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        if let Some(pathname) = command.parameter(0) {
            record.set_text(PATHNAME_KEY, pathname);
        }
        Ok(())
    }

    fn transfer(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        _record: &mut InvocationRecord,
    ) -> Result<(), HandlerError> {
        let listing = self.listing.lock().unwrap().clone();
        session.send_data(listing.as_bytes())?;
        Ok(())
    }
}

impl CommandHandler for ListCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        run_data_transfer(self, &self.invocations, command, session, config)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
