//! Module `stub`
//!
//! A recording `Session` double for exercising command handlers without
//! sockets. Replies and data-connection traffic are captured; bytes to be
//! "received" over the data connection are canned up front.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use crate::auth::UserAccount;
use crate::client::session::Session;

/// In-memory session double.
#[derive(Debug)]
pub struct StubSession {
    replies: Vec<(u16, String)>,
    sent_data: Vec<u8>,
    data_to_read: Vec<u8>,
    data_connection_opens: usize,
    data_connection_closes: usize,
    passive_port: u16,
    server_host: IpAddr,
    user_account: Option<UserAccount>,
    current_directory: Option<String>,
    pending_username: Option<String>,
    client_data_host: Option<IpAddr>,
    client_data_port: Option<u16>,
    closed: bool,
}

impl Default for StubSession {
    fn default() -> Self {
        Self {
            replies: Vec::new(),
            sent_data: Vec::new(),
            data_to_read: Vec::new(),
            data_connection_opens: 0,
            data_connection_closes: 0,
            passive_port: 0,
            server_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            user_account: None,
            current_directory: None,
            pending_username: None,
            client_data_host: None,
            client_data_port: None,
            closed: false,
        }
    }
}

impl StubSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cans the bytes the next `read_data` call will return.
    pub fn set_data_to_read(&mut self, data: Vec<u8>) {
        self.data_to_read = data;
    }

    pub fn set_passive_port(&mut self, port: u16) {
        self.passive_port = port;
    }

    pub fn set_server_host(&mut self, host: IpAddr) {
        self.server_host = host;
    }

    /// All replies sent so far, as (code, text) pairs in order.
    pub fn replies(&self) -> &[(u16, String)] {
        &self.replies
    }

    pub fn reply_codes(&self) -> Vec<u16> {
        self.replies.iter().map(|(code, _)| *code).collect()
    }

    pub fn last_reply(&self) -> Option<&(u16, String)> {
        self.replies.last()
    }

    /// Bytes written to the data connection so far.
    pub fn sent_data(&self) -> &[u8] {
        &self.sent_data
    }

    pub fn data_connection_opens(&self) -> usize {
        self.data_connection_opens
    }

    pub fn data_connection_closes(&self) -> usize {
        self.data_connection_closes
    }
}

impl Session for StubSession {
    fn send_reply(&mut self, code: u16, text: &str) -> io::Result<()> {
        self.replies.push((code, text.to_string()));
        Ok(())
    }

    fn open_data_connection(&mut self) -> io::Result<()> {
        self.data_connection_opens += 1;
        Ok(())
    }

    fn close_data_connection(&mut self) -> io::Result<()> {
        self.data_connection_closes += 1;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> io::Result<()> {
        self.sent_data.extend_from_slice(data);
        Ok(())
    }

    fn read_data(&mut self) -> io::Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.data_to_read))
    }

    fn switch_to_passive_mode(&mut self) -> io::Result<u16> {
        Ok(self.passive_port)
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
