//! Server configuration
//!
//! The read-only lookup surface exposed to command handlers: the
//! filesystem, user accounts, reply-text catalog, system name, help text,
//! and the reply code used for generic filesystem errors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::UserAccount;
use crate::protocol::replies::{FILE_ERROR, ReplyCatalog};
use crate::storage::filesystem::FileSystem;
use crate::storage::memory::InMemoryFileSystem;

/// Configuration shared, read-only, with every command handler.
#[derive(Clone)]
pub struct ServerConfig {
    file_system: Arc<dyn FileSystem>,
    user_accounts: HashMap<String, UserAccount>,
    reply_catalog: ReplyCatalog,
    system_name: String,
    help_text: HashMap<String, String>,
    file_system_error_reply_code: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            file_system: Arc::new(InMemoryFileSystem::new()),
            user_accounts: HashMap::new(),
            reply_catalog: ReplyCatalog::default(),
            system_name: "UNIX".to_string(),
            help_text: HashMap::new(),
            file_system_error_reply_code: FILE_ERROR,
        }
    }
}

impl ServerConfig {
    pub fn file_system(&self) -> &dyn FileSystem {
        self.file_system.as_ref()
    }

    pub fn set_file_system(&mut self, file_system: Arc<dyn FileSystem>) {
        self.file_system = file_system;
    }

    pub fn user_account(&self, username: &str) -> Option<&UserAccount> {
        self.user_accounts.get(username)
    }

    /// Inserts or replaces the account keyed by its username; a previous
    /// account under the same username is discarded.
    pub fn add_user_account(&mut self, account: UserAccount) {
        self.user_accounts
            .insert(account.username().to_string(), account);
    }

    pub fn set_user_accounts(&mut self, accounts: Vec<UserAccount>) {
        self.user_accounts.clear();
        for account in accounts {
            self.add_user_account(account);
        }
    }

    pub fn reply_catalog(&self) -> &ReplyCatalog {
        &self.reply_catalog
    }

    pub fn set_reply_text(&mut self, key: &str, template: &str) {
        self.reply_catalog.set(key, template);
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn set_system_name(&mut self, system_name: &str) {
        self.system_name = system_name.to_string();
    }

    /// Help text for `name`; the empty string keys the general help text.
    pub fn help_text(&self, name: &str) -> Option<&str> {
        self.help_text.get(name).map(String::as_str)
    }

    pub fn set_help_text(&mut self, name: &str, text: &str) {
        self.help_text.insert(name.to_string(), text.to_string());
    }

    pub fn file_system_error_reply_code(&self) -> u16 {
        self.file_system_error_reply_code
    }

    pub fn set_file_system_error_reply_code(&mut self, code: u16) {
        self.file_system_error_reply_code = code;
    }
}
