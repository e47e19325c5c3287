//! Module `connection`
//!
//! Data-connection setup commands: PORT (active mode target), PASV and
//! EPSV (passive listening mode).

use std::any::Any;
use std::net::{IpAddr, Ipv4Addr};

use crate::client::session::Session;
use crate::commands::dispatcher::{CommandHandler, send_reply};
use crate::commands::invocation::{HOST_KEY, InvocationLog, InvocationRecord, PORT_KEY};
use crate::commands::support::verify_logged_in;
use crate::error::{CommandError, HandlerError};
use crate::protocol::command::Command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Parses the six PORT parameters: four host octets followed by the two
/// port bytes (`port = p1*256 + p2`).
fn parse_host_and_port(command: &Command) -> Result<(Ipv4Addr, u16), CommandError> {
    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        let parameter = command.required_parameter(i)?;
        *octet = parameter.parse().map_err(|_| CommandError::Syntax)?;
    }
    let host = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = u16::from(octets[4]) * 256 + u16::from(octets[5]);
    Ok((host, port))
}

/// Handles PORT: stores the client's advertised data-connection target in
/// the session.
#[derive(Debug, Default)]
pub struct PortCommandHandler {
    invocations: InvocationLog,
}

impl PortCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl CommandHandler for PortCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command.name());
        let result: Result<(), HandlerError> = (|| {
            let (host, port) = parse_host_and_port(command)?;
            record.set_text(HOST_KEY, &host.to_string());
            record.set_text(PORT_KEY, &port.to_string());
            session.set_client_data_host(IpAddr::V4(host));
            session.set_client_data_port(port);
            send_reply(session, config, replies::OK, None, &[])?;
            Ok(())
        })();
        self.invocations.append(record);
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles PASV: switches the session into passive listening mode and
/// advertises the socket as `h1,h2,h3,h4,p1,p2`.
#[derive(Debug, Default)]
pub struct PasvCommandHandler;

impl PasvCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for PasvCommandHandler {
    fn handle(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        verify_logged_in(session)?;
        let port = session.switch_to_passive_mode()?;
        let host = match session.server_host() {
            IpAddr::V4(host) => host,
            IpAddr::V6(host) => {
                return Err(CommandError::IllegalState(format!(
                    "passive mode requires an IPv4 server host, got {}",
                    host
                ))
                .into());
            }
        };
        let octets = host.octets();
        let socket = format!(
            "{},{},{},{},{},{}",
            octets[0],
            octets[1],
            octets[2],
            octets[3],
            port >> 8,
            port & 0xff
        );
        send_reply(session, config, replies::PASSIVE_MODE, None, &[&socket])?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles EPSV: passive mode with the extended reply format embedding only
/// the port.
#[derive(Debug, Default)]
pub struct EpsvCommandHandler;

impl EpsvCommandHandler {
    pub fn new() -> Self {
        Self
    }
}

impl CommandHandler for EpsvCommandHandler {
    fn handle(
        &self,
        _command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        verify_logged_in(session)?;
        let port = session.switch_to_passive_mode()?;
        send_reply(
            session,
            config,
            replies::EXTENDED_PASSIVE_MODE,
            None,
            &[&port.to_string()],
        )?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
