//! Fake FTP Server - Entry Point
//!
//! Boots a standalone fake FTP server from `config.toml`.

use std::sync::Arc;

use log::{error, info};

use fake_ftp_server::Server;
use fake_ftp_server::auth::UserAccount;
use fake_ftp_server::config::StartupConfig;
use fake_ftp_server::storage::{FileEntry, InMemoryFileSystem};

fn main() {
    // env_logger picks up the RUST_LOG environment variable.
    env_logger::init();

    info!("Launching fake FTP server...");

    let startup = StartupConfig::load();

    let file_system = InMemoryFileSystem::new();
    let mut server = Server::new();

    for user in &startup.users {
        file_system.add(FileEntry::directory(&user.home_directory));
        let mut account = UserAccount::new(&user.username, &user.password, &user.home_directory);
        account.set_groups(user.groups.clone());
        server.add_user_account(account);
    }

    server.set_file_system(Arc::new(file_system));
    server.set_system_name(&startup.system_name);
    server.set_bind_address(&startup.bind_address);
    server.set_control_port(startup.control_port);

    match server.start() {
        Ok(running) => {
            info!("Serving on {}", running.local_addr());
            running.join();
        }
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    }
}
