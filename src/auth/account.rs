//! Module `account`
//!
//! Defines `UserAccount`: per-user credentials, home directory, group
//! memberships, login flags, default permission masks, and the permission
//! checks handlers apply to filesystem entries.

use crate::storage::filesystem::FileEntry;
use crate::storage::permissions::Permissions;

/// Group name assumed when an account has no explicit groups.
pub const DEFAULT_GROUP: &str = "users";

/// A configured server user.
///
/// Constructed once per user before the server starts serving and read,
/// never mutated, by command handlers afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    username: String,
    password: String,
    home_directory: String,
    groups: Vec<String>,
    password_required_for_login: bool,
    password_checked_during_validation: bool,
    account_required_for_login: bool,
    default_permissions_for_new_file: Permissions,
    default_permissions_for_new_directory: Permissions,
}

impl UserAccount {
    pub fn new(username: &str, password: &str, home_directory: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            home_directory: home_directory.to_string(),
            groups: Vec::new(),
            password_required_for_login: true,
            password_checked_during_validation: true,
            account_required_for_login: false,
            default_permissions_for_new_file: Permissions::DEFAULT_FILE,
            default_permissions_for_new_directory: Permissions::ALL,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn home_directory(&self) -> &str {
        &self.home_directory
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// The first configured group, or the fixed default group name when the
    /// list is empty.
    pub fn primary_group(&self) -> &str {
        self.groups.first().map(String::as_str).unwrap_or(DEFAULT_GROUP)
    }

    pub fn password_required_for_login(&self) -> bool {
        self.password_required_for_login
    }

    pub fn account_required_for_login(&self) -> bool {
        self.account_required_for_login
    }

    pub fn default_permissions_for_new_file(&self) -> Permissions {
        self.default_permissions_for_new_file
    }

    pub fn default_permissions_for_new_directory(&self) -> Permissions {
        self.default_permissions_for_new_directory
    }

    pub fn set_groups(&mut self, groups: Vec<String>) {
        self.groups = groups;
    }

    pub fn set_password_required_for_login(&mut self, required: bool) {
        self.password_required_for_login = required;
    }

    pub fn set_password_checked_during_validation(&mut self, checked: bool) {
        self.password_checked_during_validation = checked;
    }

    pub fn set_account_required_for_login(&mut self, required: bool) {
        self.account_required_for_login = required;
    }

    pub fn set_default_permissions_for_new_file(&mut self, permissions: Permissions) {
        self.default_permissions_for_new_file = permissions;
    }

    pub fn set_default_permissions_for_new_directory(&mut self, permissions: Permissions) {
        self.default_permissions_for_new_directory = permissions;
    }

    /// An account is valid when its home directory is set. Whether the
    /// directory actually exists on the live filesystem is checked
    /// separately at login time.
    pub fn is_valid(&self) -> bool {
        !self.home_directory.is_empty()
    }

    /// Validates a candidate password.
    ///
    /// Always true when password checking is disabled for this account;
    /// otherwise an exact, case-sensitive comparison. Subclass-style
    /// schemes (e.g. hashed passwords) override `passwords_match`.
    pub fn is_valid_password(&self, candidate: &str) -> bool {
        assert!(
            !self.username.is_empty(),
            "username is required to validate a password"
        );
        !self.password_checked_during_validation || self.passwords_match(candidate)
    }

    fn passwords_match(&self, candidate: &str) -> bool {
        candidate == self.password
    }

    /// Whether this account may read `entry`.
    ///
    /// Entries without permissions are readable by anyone; otherwise the
    /// user bits apply when the account owns the entry, the group bits when
    /// any account group matches the entry group, the world bits otherwise.
    pub fn can_read(&self, entry: &FileEntry) -> bool {
        match &entry.permissions {
            None => true,
            Some(p) => {
                if self.owns(entry) {
                    p.user_can_read()
                } else if self.in_group(entry) {
                    p.group_can_read()
                } else {
                    p.world_can_read()
                }
            }
        }
    }

    /// Whether this account may write `entry`.
    pub fn can_write(&self, entry: &FileEntry) -> bool {
        match &entry.permissions {
            None => true,
            Some(p) => {
                if self.owns(entry) {
                    p.user_can_write()
                } else if self.in_group(entry) {
                    p.group_can_write()
                } else {
                    p.world_can_write()
                }
            }
        }
    }

    /// Whether this account may execute `entry`.
    pub fn can_execute(&self, entry: &FileEntry) -> bool {
        match &entry.permissions {
            None => true,
            Some(p) => {
                if self.owns(entry) {
                    p.user_can_execute()
                } else if self.in_group(entry) {
                    p.group_can_execute()
                } else {
                    p.world_can_execute()
                }
            }
        }
    }

    fn owns(&self, entry: &FileEntry) -> bool {
        entry.owner.as_deref() == Some(self.username.as_str())
    }

    fn in_group(&self, entry: &FileEntry) -> bool {
        match entry.group.as_deref() {
            Some(group) => self.groups.iter().any(|g| g == group),
            None => false,
        }
    }
}
