//! Module `core`
//!
//! The server façade: owns the command registry and configuration, boots
//! the default handler set, and runs the thread-per-connection accept loop.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use crate::auth::UserAccount;
use crate::client::handler::handle_connection;
use crate::commands::connection::{EpsvCommandHandler, PasvCommandHandler, PortCommandHandler};
use crate::commands::dispatcher::CommandHandler;
use crate::commands::login::{PassCommandHandler, UserCommandHandler};
use crate::commands::simple::{
    HelpCommandHandler, NoopCommandHandler, PwdCommandHandler, QuitCommandHandler,
    StaticReplyCommandHandler, SystCommandHandler,
};
use crate::commands::transfer::{ListCommandHandler, RetrCommandHandler, StorCommandHandler};
use crate::protocol::replies;
use crate::server::config::ServerConfig;
use crate::storage::filesystem::FileSystem;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_CONTROL_PORT: u16 = 2121;

/// The fake FTP server: command registry plus configuration, mutated freely
/// before `start` and shared read-only afterwards.
pub struct Server {
    config: ServerConfig,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    bind_address: String,
    control_port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            handlers: default_handlers(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            control_port: DEFAULT_CONTROL_PORT,
        }
    }

    pub fn set_bind_address(&mut self, address: &str) {
        self.bind_address = address.to_string();
    }

    pub fn set_control_port(&mut self, port: u16) {
        self.control_port = port;
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn add_user_account(&mut self, account: UserAccount) {
        self.config.add_user_account(account);
    }

    pub fn set_user_accounts(&mut self, accounts: Vec<UserAccount>) {
        self.config.set_user_accounts(accounts);
    }

    pub fn set_file_system(&mut self, file_system: Arc<dyn FileSystem>) {
        self.config.set_file_system(file_system);
    }

    pub fn set_system_name(&mut self, system_name: &str) {
        self.config.set_system_name(system_name);
    }

    pub fn set_help_text(&mut self, name: &str, text: &str) {
        self.config.set_help_text(name, text);
    }

    pub fn set_reply_text(&mut self, key: &str, template: &str) {
        self.config.set_reply_text(key, template);
    }

    pub fn set_file_system_error_reply_code(&mut self, code: u16) {
        self.config.set_file_system_error_reply_code(code);
    }

    /// Replaces the handler for `name` wholesale.
    pub fn set_command_handler(&mut self, name: &str, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(name.to_ascii_uppercase(), handler);
    }

    /// A shared handle on the registered handler, e.g. for invocation-log
    /// introspection via `as_any`.
    pub fn command_handler(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(&name.to_ascii_uppercase()).cloned()
    }

    /// Binds the control listener and spawns the accept loop; the returned
    /// handle stops or joins the running server.
    pub fn start(self) -> io::Result<RunningServer> {
        let listener = TcpListener::bind((self.bind_address.as_str(), self.control_port))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        info!("Server bound to {}", local_addr);

        let config = Arc::new(self.config);
        let handlers = Arc::new(self.handlers);
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::spawn(move || accept_loop(listener, config, handlers, flag));

        Ok(RunningServer {
            local_addr,
            shutdown,
            handle,
        })
    }
}

/// Handle on a started server.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// The address the control listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for the accept loop to exit.
    /// Connections already being serviced run to completion on their own
    /// threads.
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if self.handle.join().is_err() {
            error!("Accept loop panicked during shutdown");
        }
    }

    /// Blocks until the accept loop exits.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("Accept loop panicked");
        }
    }
}

fn accept_loop(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    handlers: Arc<HashMap<String, Arc<dyn CommandHandler>>>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, addr)) => {
                info!("New connection: {}", addr);
                if let Err(e) = stream.set_nonblocking(false) {
                    error!("Failed to configure stream for {}: {}", addr, e);
                    continue;
                }
                let config = Arc::clone(&config);
                let handlers = Arc::clone(&handlers);
                thread::spawn(move || handle_connection(stream, &config, &handlers));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
    info!("Server stopped");
}

/// Registers the default handler set for the full command repertoire.
fn default_handlers() -> HashMap<String, Arc<dyn CommandHandler>> {
    let mut handlers: HashMap<String, Arc<dyn CommandHandler>> = HashMap::new();

    handlers.insert("USER".into(), Arc::new(UserCommandHandler::new()));
    handlers.insert("PASS".into(), Arc::new(PassCommandHandler::new()));
    handlers.insert("NOOP".into(), Arc::new(NoopCommandHandler::new()));
    handlers.insert("QUIT".into(), Arc::new(QuitCommandHandler::new()));
    handlers.insert("SYST".into(), Arc::new(SystCommandHandler::new()));
    handlers.insert("HELP".into(), Arc::new(HelpCommandHandler::new()));
    handlers.insert("PORT".into(), Arc::new(PortCommandHandler::new()));
    handlers.insert("PASV".into(), Arc::new(PasvCommandHandler::new()));
    handlers.insert("EPSV".into(), Arc::new(EpsvCommandHandler::new()));
    handlers.insert("RETR".into(), Arc::new(RetrCommandHandler::new()));
    handlers.insert("STOR".into(), Arc::new(StorCommandHandler::new()));
    handlers.insert("APPE".into(), Arc::new(StorCommandHandler::new()));
    handlers.insert("STOU".into(), Arc::new(StorCommandHandler::new()));
    handlers.insert("LIST".into(), Arc::new(ListCommandHandler::new()));
    handlers.insert("NLST".into(), Arc::new(ListCommandHandler::new()));

    // PWD and XPWD share one handler.
    let pwd: Arc<dyn CommandHandler> = Arc::new(PwdCommandHandler::new());
    handlers.insert("PWD".into(), Arc::clone(&pwd));
    handlers.insert("XPWD".into(), pwd);

    let static_replies: &[(&str, u16)] = &[
        ("ABOR", replies::TRANSFER_COMPLETE),
        ("ACCT", replies::LOGIN_SUCCESS),
        ("ALLO", replies::OK),
        ("CDUP", replies::OK),
        ("CWD", replies::FILE_ACTION_OK),
        ("DELE", replies::FILE_ACTION_OK),
        ("MKD", replies::PATHNAME_CREATED),
        ("MODE", replies::OK),
        ("REIN", replies::READY),
        ("REST", replies::FILE_ACTION_PENDING),
        ("RMD", replies::FILE_ACTION_OK),
        ("RNFR", replies::FILE_ACTION_PENDING),
        ("RNTO", replies::FILE_ACTION_OK),
        ("SITE", replies::OK),
        ("STRU", replies::OK),
        ("TYPE", replies::OK),
    ];
    for (name, code) in static_replies {
        handlers.insert(
            (*name).into(),
            Arc::new(StaticReplyCommandHandler::new(*code)),
        );
    }

    handlers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_set_is_complete() {
        let server = Server::new();
        for name in [
            "ABOR", "ACCT", "ALLO", "APPE", "CDUP", "CWD", "DELE", "EPSV", "HELP", "LIST", "MKD",
            "MODE", "NLST", "NOOP", "PASS", "PASV", "PORT", "PWD", "QUIT", "REIN", "REST", "RETR",
            "RMD", "RNFR", "RNTO", "SITE", "STOR", "STOU", "STRU", "SYST", "TYPE", "USER", "XPWD",
        ] {
            assert!(
                server.command_handler(name).is_some(),
                "missing handler for {}",
                name
            );
        }
    }

    #[test]
    fn test_xpwd_aliases_pwd() {
        let server = Server::new();
        let pwd = server.command_handler("PWD").unwrap();
        let xpwd = server.command_handler("XPWD").unwrap();
        assert!(Arc::ptr_eq(&pwd, &xpwd));
    }

    #[test]
    fn test_command_handler_lookup_is_case_insensitive() {
        let server = Server::new();
        assert!(server.command_handler("retr").is_some());
    }

    #[test]
    fn test_set_command_handler_replaces() {
        let mut server = Server::new();
        let replacement = Arc::new(RetrCommandHandler::new());
        replacement.set_file_contents("canned");
        server.set_command_handler("RETR", replacement.clone());

        let registered = server.command_handler("RETR").unwrap();
        assert!(
            registered
                .as_any()
                .downcast_ref::<RetrCommandHandler>()
                .is_some()
        );
    }

    #[test]
    fn test_typed_introspection_of_default_handlers() {
        let server = Server::new();
        let user = server.command_handler("USER").unwrap();
        let user = user
            .as_any()
            .downcast_ref::<UserCommandHandler>()
            .expect("USER handler type");
        assert!(user.invocations().is_empty());
    }
}
