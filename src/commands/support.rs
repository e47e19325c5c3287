//! Module `support`
//!
//! Shared helper operations for concrete command handlers: login state
//! checks, permission verification, path resolution, and account
//! validation.

use std::io;

use crate::auth::UserAccount;
use crate::client::session::Session;
use crate::commands::dispatcher::send_reply;
use crate::error::{CommandError, HandlerError};
use crate::protocol::replies;
use crate::server::config::ServerConfig;
use crate::storage::filesystem::FileSystem;

pub const DOES_NOT_EXIST_KEY: &str = "filesystem.doesNotExist";
pub const CANNOT_READ_KEY: &str = "filesystem.cannotRead";
pub const CANNOT_WRITE_KEY: &str = "filesystem.cannotWrite";
pub const CANNOT_EXECUTE_KEY: &str = "filesystem.cannotExecute";

/// Returns the authenticated account, failing with `NotLoggedIn` when the
/// session has none bound.
pub fn verify_logged_in(session: &dyn Session) -> Result<UserAccount, CommandError> {
    session.user_account().cloned().ok_or(CommandError::NotLoggedIn)
}

/// Fails with a filesystem error carrying `message_key` unless `condition`
/// holds.
pub fn verify_file_system_condition(
    condition: bool,
    message_key: &'static str,
    path: &str,
) -> Result<(), CommandError> {
    if condition {
        Ok(())
    } else {
        Err(CommandError::FileSystem {
            message_key,
            path: path.to_string(),
        })
    }
}

/// Fails unless the authenticated account may read the entry at `path`.
pub fn verify_read_permission(
    session: &dyn Session,
    file_system: &dyn FileSystem,
    path: &str,
) -> Result<(), CommandError> {
    let account = verify_logged_in(session)?;
    let entry = file_system
        .entry(path)
        .ok_or_else(|| CommandError::FileSystem {
            message_key: DOES_NOT_EXIST_KEY,
            path: path.to_string(),
        })?;
    verify_file_system_condition(account.can_read(&entry), CANNOT_READ_KEY, path)
}

/// Fails unless the authenticated account may write the entry at `path`.
pub fn verify_write_permission(
    session: &dyn Session,
    file_system: &dyn FileSystem,
    path: &str,
) -> Result<(), CommandError> {
    let account = verify_logged_in(session)?;
    let entry = file_system
        .entry(path)
        .ok_or_else(|| CommandError::FileSystem {
            message_key: DOES_NOT_EXIST_KEY,
            path: path.to_string(),
        })?;
    verify_file_system_condition(account.can_write(&entry), CANNOT_WRITE_KEY, path)
}

/// Fails unless the authenticated account may execute the entry at `path`.
pub fn verify_execute_permission(
    session: &dyn Session,
    file_system: &dyn FileSystem,
    path: &str,
) -> Result<(), CommandError> {
    let account = verify_logged_in(session)?;
    let entry = file_system
        .entry(path)
        .ok_or_else(|| CommandError::FileSystem {
            message_key: DOES_NOT_EXIST_KEY,
            path: path.to_string(),
        })?;
    verify_file_system_condition(account.can_execute(&entry), CANNOT_EXECUTE_KEY, path)
}

/// Resolves a possibly-relative path against the session's current
/// directory.
///
/// No path yields the current directory unchanged; an absolute path is
/// returned unchanged; a relative path is joined with the current directory
/// under the filesystem's path rules.
pub fn real_path(
    session: &dyn Session,
    file_system: &dyn FileSystem,
    path: Option<&str>,
) -> String {
    let current = session.current_directory().unwrap_or("");
    match path {
        None => current.to_string(),
        Some(p) if file_system.is_absolute(p) => p.to_string(),
        Some(p) => file_system.join(current, p),
    }
}

/// Checks that `username` names a usable account: configured, valid, and
/// with a home directory the filesystem recognizes.
///
/// On failure a 530 reply naming the problem is sent and `Ok(false)`
/// returned; `Ok(true)` means both checks passed.
pub fn validate_user_account(
    username: &str,
    session: &mut dyn Session,
    config: &ServerConfig,
) -> Result<bool, HandlerError> {
    let home_directory = match config.user_account(username) {
        Some(account) if account.is_valid() => account.home_directory().to_string(),
        _ => {
            send_reply(
                session,
                config,
                replies::NOT_LOGGED_IN,
                Some("login.userAccountNotValid"),
                &[username],
            )?;
            return Ok(false);
        }
    };

    if !config.file_system().is_directory(&home_directory) {
        send_reply(
            session,
            config,
            replies::NOT_LOGGED_IN,
            Some("login.homeDirectoryNotValid"),
            &[username, &home_directory],
        )?;
        return Ok(false);
    }

    Ok(true)
}

/// Completes a login: sends the success reply, then binds the account and
/// positions the session in its home directory.
pub fn login(
    account: &UserAccount,
    session: &mut dyn Session,
    config: &ServerConfig,
    code: u16,
    message_key: &str,
) -> io::Result<()> {
    send_reply(session, config, code, Some(message_key), &[])?;
    session.set_user_account(account.clone());
    session.set_current_directory(account.home_directory());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubSession;
    use crate::storage::filesystem::FileEntry;
    use crate::storage::memory::InMemoryFileSystem;
    use crate::storage::permissions::Permissions;
    use std::sync::Arc;

    fn logged_in_session(account: UserAccount) -> StubSession {
        let mut session = StubSession::new();
        session.set_user_account(account);
        session
    }

    #[test]
    fn test_verify_logged_in() {
        let session = StubSession::new();
        assert_eq!(verify_logged_in(&session), Err(CommandError::NotLoggedIn));

        let session = logged_in_session(UserAccount::new("joe", "pw", "/home/joe"));
        assert_eq!(verify_logged_in(&session).unwrap().username(), "joe");
    }

    #[test]
    fn test_real_path_none_returns_current_directory() {
        let fs = InMemoryFileSystem::new();
        let mut session = StubSession::new();
        session.set_current_directory("/home/joe");
        assert_eq!(real_path(&session, &fs, None), "/home/joe");
    }

    #[test]
    fn test_real_path_absolute_is_unchanged() {
        let fs = InMemoryFileSystem::new();
        let mut session = StubSession::new();
        session.set_current_directory("/home/joe");
        assert_eq!(real_path(&session, &fs, Some("/abs/path")), "/abs/path");
    }

    #[test]
    fn test_real_path_relative_is_joined() {
        let fs = InMemoryFileSystem::new();
        let mut session = StubSession::new();
        session.set_current_directory("/home/joe");
        assert_eq!(
            real_path(&session, &fs, Some("rel/path")),
            "/home/joe/rel/path"
        );
    }

    #[test]
    fn test_verify_read_permission() {
        let fs = InMemoryFileSystem::new();
        fs.add(
            FileEntry::file("/data/secret.txt")
                .with_owner("joe")
                .with_group("dev")
                .with_permissions(Permissions::parse("rw-------").unwrap()),
        );

        let session = logged_in_session(UserAccount::new("joe", "pw", "/home/joe"));
        assert!(verify_read_permission(&session, &fs, "/data/secret.txt").is_ok());

        let session = logged_in_session(UserAccount::new("mary", "pw", "/home/mary"));
        assert_eq!(
            verify_read_permission(&session, &fs, "/data/secret.txt"),
            Err(CommandError::FileSystem {
                message_key: CANNOT_READ_KEY,
                path: "/data/secret.txt".to_string(),
            })
        );
    }

    #[test]
    fn test_verify_write_permission_missing_entry() {
        let fs = InMemoryFileSystem::new();
        let session = logged_in_session(UserAccount::new("joe", "pw", "/home/joe"));
        assert_eq!(
            verify_write_permission(&session, &fs, "/no/such"),
            Err(CommandError::FileSystem {
                message_key: DOES_NOT_EXIST_KEY,
                path: "/no/such".to_string(),
            })
        );
    }

    #[test]
    fn test_verify_execute_permission() {
        let fs = InMemoryFileSystem::new();
        fs.add(
            FileEntry::file("/bin/tool")
                .with_owner("joe")
                .with_group("dev")
                .with_permissions(Permissions::parse("rwx------").unwrap()),
        );

        let session = logged_in_session(UserAccount::new("joe", "pw", "/home/joe"));
        assert!(verify_execute_permission(&session, &fs, "/bin/tool").is_ok());

        let mut account = UserAccount::new("mary", "pw", "/home/mary");
        account.set_groups(vec!["dev".to_string()]);
        let session = logged_in_session(account);
        assert!(verify_execute_permission(&session, &fs, "/bin/tool").is_err());
    }

    #[test]
    fn test_validate_user_account_unknown_user() {
        let mut config = ServerConfig::default();
        config.add_user_account(UserAccount::new("joe", "pw", "/home/joe"));
        let mut session = StubSession::new();

        let valid = validate_user_account("nobody", &mut session, &config).unwrap();
        assert!(!valid);
        let (code, text) = session.last_reply().unwrap();
        assert_eq!(*code, 530);
        assert!(text.contains("nobody"));
    }

    #[test]
    fn test_validate_user_account_missing_home_directory() {
        let mut config = ServerConfig::default();
        config.add_user_account(UserAccount::new("joe", "pw", "/home/joe"));
        let mut session = StubSession::new();

        // The filesystem has no /home/joe directory.
        let valid = validate_user_account("joe", &mut session, &config).unwrap();
        assert!(!valid);
        let (code, text) = session.last_reply().unwrap();
        assert_eq!(*code, 530);
        assert!(text.contains("joe"));
        assert!(text.contains("/home/joe"));
    }

    #[test]
    fn test_validate_user_account_success() {
        let fs = InMemoryFileSystem::new();
        fs.add(FileEntry::directory("/home/joe"));

        let mut config = ServerConfig::default();
        config.set_file_system(Arc::new(fs));
        config.add_user_account(UserAccount::new("joe", "pw", "/home/joe"));
        let mut session = StubSession::new();

        assert!(validate_user_account("joe", &mut session, &config).unwrap());
        assert!(session.replies().is_empty());
    }

    #[test]
    fn test_login_binds_account_and_home_directory() {
        let config = ServerConfig::default();
        let account = UserAccount::new("joe", "pw", "/home/joe");
        let mut session = StubSession::new();

        login(&account, &mut session, &config, replies::LOGIN_SUCCESS, "pass").unwrap();

        assert_eq!(session.reply_codes(), vec![230]);
        assert_eq!(session.user_account().unwrap().username(), "joe");
        assert_eq!(session.current_directory(), Some("/home/joe"));
    }
}
