//! Module `handler`
//!
//! Services one FTP client control connection: sends the greeting, reads
//! CRLF-terminated command lines, and routes each through the dispatcher.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::sync::Arc;

use log::{error, info};

use crate::client::connection::ClientSession;
use crate::client::session::Session;
use crate::commands::dispatcher::{CommandHandler, dispatch, send_reply};
use crate::protocol::command::parse_command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Processes commands from a single client until it quits, disconnects, or
/// a fatal I/O error occurs.
pub fn handle_connection(
    stream: TcpStream,
    config: &ServerConfig,
    handlers: &HashMap<String, Arc<dyn CommandHandler>>,
) {
    let peer = match stream.peer_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to resolve peer address: {}", e);
            return;
        }
    };
    let server_host = match stream.local_addr() {
        Ok(addr) => addr.ip(),
        Err(e) => {
            error!("Failed to resolve local address for {}: {}", peer, e);
            return;
        }
    };
    let write_stream = match stream.try_clone() {
        Ok(clone) => clone,
        Err(e) => {
            error!("Failed to clone control stream for {}: {}", peer, e);
            return;
        }
    };

    let mut session = ClientSession::new(write_stream, server_host);

    // Service ready greeting.
    if let Err(e) = send_reply(&mut session, config, replies::READY, None, &[]) {
        error!("Failed to send greeting to {}: {}", peer, e);
        return;
    }

    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("Connection closed by client {}", peer);
                break;
            }
            Ok(_) => {
                let command = parse_command(&line);
                info!("Received from {}: {:?}", peer, command);

                let result = match handlers.get(command.name()) {
                    Some(handler) => dispatch(handler.as_ref(), &command, &mut session, config),
                    None => send_reply(&mut session, config, replies::SYNTAX_ERROR, None, &[]),
                };

                if let Err(e) = result {
                    error!("Session with {} failed: {}", peer, e);
                    break;
                }
                if session.is_closed() {
                    info!("Client {} requested to quit", peer);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from stream: {}", e);
                break;
            }
        }
    }

    info!("Client {} disconnected", peer);
}
