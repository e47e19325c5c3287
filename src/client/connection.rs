//! Module `connection`
//!
//! Socket-backed `Session` implementation: owns the control stream's write
//! half and the active/passive data-connection plumbing.

use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, TcpListener, TcpStream};

use log::info;

use crate::auth::UserAccount;
use crate::client::session::Session;
use crate::protocol::replies::format_reply;

/// Per-connection session state over a real TCP control connection.
pub struct ClientSession {
    stream: TcpStream,
    server_host: IpAddr,
    passive_listener: Option<TcpListener>,
    data_stream: Option<TcpStream>,
    user_account: Option<UserAccount>,
    current_directory: Option<String>,
    pending_username: Option<String>,
    client_data_host: Option<IpAddr>,
    client_data_port: Option<u16>,
    closed: bool,
}

impl ClientSession {
    pub fn new(stream: TcpStream, server_host: IpAddr) -> Self {
        Self {
            stream,
            server_host,
            passive_listener: None,
            data_stream: None,
            user_account: None,
            current_directory: None,
            pending_username: None,
            client_data_host: None,
            client_data_port: None,
            closed: false,
        }
    }
}

impl Session for ClientSession {
    fn send_reply(&mut self, code: u16, text: &str) -> io::Result<()> {
        self.stream.write_all(format_reply(code, text).as_bytes())?;
        self.stream.flush()
    }

    fn open_data_connection(&mut self) -> io::Result<()> {
        if let Some(listener) = self.passive_listener.take() {
            let (stream, addr) = listener.accept()?;
            info!("Accepted passive data connection from {}", addr);
            self.data_stream = Some(stream);
            return Ok(());
        }

        let host = self.client_data_host.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "No data connection target set")
        })?;
        let port = self.client_data_port.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "No data connection port set")
        })?;
        let stream = TcpStream::connect((host, port))?;
        info!("Opened active data connection to {}:{}", host, port);
        self.data_stream = Some(stream);
        Ok(())
    }

    fn close_data_connection(&mut self) -> io::Result<()> {
        if let Some(stream) = self.data_stream.take() {
            // The peer may already have shut the connection down.
            let _ = stream.shutdown(Shutdown::Both);
        }
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.data_stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "Data connection is not open")
        })?;
        stream.write_all(data)?;
        stream.flush()
    }

    fn read_data(&mut self) -> io::Result<Vec<u8>> {
        let stream = self.data_stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "Data connection is not open")
        })?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        Ok(data)
    }

    fn switch_to_passive_mode(&mut self) -> io::Result<u16> {
        let listener = TcpListener::bind((self.server_host, 0))?;
        let port = listener.local_addr()?.port();
        info!("Listening for passive data connection on port {}", port);
        self.passive_listener = Some(listener);
        Ok(port)
    }

    fn server_host(&self) -> IpAddr {
        self.server_host
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn user_account(&self) -> Option<&UserAccount> {
        self.user_account.as_ref()
    }

    fn set_user_account(&mut self, account: UserAccount) {
        self.user_account = Some(account);
    }

    fn current_directory(&self) -> Option<&str> {
        self.current_directory.as_deref()
    }

    fn set_current_directory(&mut self, directory: &str) {
        self.current_directory = Some(directory.to_string());
    }

    fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    fn set_pending_username(&mut self, username: &str) {
        self.pending_username = Some(username.to_string());
    }

    fn client_data_host(&self) -> Option<IpAddr> {
        self.client_data_host
    }

    fn set_client_data_host(&mut self, host: IpAddr) {
        self.client_data_host = Some(host);
    }

    fn client_data_port(&self) -> Option<u16> {
        self.client_data_port
    }

    fn set_client_data_port(&mut self, port: u16) {
        self.client_data_port = Some(port);
    }
}
