//! Module `session`
//!
//! Defines the per-connection state and I/O surface command handlers
//! operate on. All I/O operations return `io::Result`; a failure is fatal
//! to the session and never becomes a protocol reply.

use std::io;
use std::net::IpAddr;

use crate::auth::UserAccount;

/// One client control connection: typed per-connection attributes plus the
/// control- and data-connection operations.
///
/// A session is serviced by a single thread; commands within it are
/// processed strictly in arrival order.
pub trait Session {
    /// Writes one reply to the control connection.
    fn send_reply(&mut self, code: u16, text: &str) -> io::Result<()>;

    /// Opens the data connection: accepts on the passive listener when one
    /// is pending, otherwise connects to the client's advertised data
    /// target.
    fn open_data_connection(&mut self) -> io::Result<()>;

    /// Closes the data connection, if open.
    fn close_data_connection(&mut self) -> io::Result<()>;

    /// Writes bytes to the open data connection.
    fn send_data(&mut self, data: &[u8]) -> io::Result<()>;

    /// Reads all bytes from the open data connection.
    fn read_data(&mut self) -> io::Result<Vec<u8>>;

    /// Starts listening for a passive-mode data connection, returning the
    /// ephemeral port chosen.
    fn switch_to_passive_mode(&mut self) -> io::Result<u16>;

    /// The address the server side of this session is reachable on.
    fn server_host(&self) -> IpAddr;

    /// Marks the session closed; the connection loop terminates afterwards.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// The authenticated account, absent until login completes.
    fn user_account(&self) -> Option<&UserAccount>;

    fn set_user_account(&mut self, account: UserAccount);

    fn current_directory(&self) -> Option<&str>;

    fn set_current_directory(&mut self, directory: &str);

    /// Username submitted by USER, consumed by PASS.
    fn pending_username(&self) -> Option<&str>;

    fn set_pending_username(&mut self, username: &str);

    /// Data-connection target advertised by PORT.
    fn client_data_host(&self) -> Option<IpAddr>;

    fn set_client_data_host(&mut self, host: IpAddr);

    fn client_data_port(&self) -> Option<u16>;

    fn set_client_data_port(&mut self, port: u16);
}
