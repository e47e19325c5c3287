//! Module `login`
//!
//! The two-phase login flow: USER records the claimed identity and asks
//! for a password; PASS validates the account and completes the login.

use std::any::Any;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::session::Session;
use crate::commands::dispatcher::{CommandHandler, send_reply};
use crate::commands::invocation::{InvocationLog, InvocationRecord, PASSWORD_KEY, USERNAME_KEY};
use crate::commands::support::{login, validate_user_account};
use crate::error::{CommandError, HandlerError};
use crate::protocol::command::Command;
use crate::protocol::replies;
use crate::server::config::ServerConfig;

/// Handles USER: records the submitted username and stores it in the
/// session for PASS to consume.
///
/// With a reply-code override configured, that fixed code is sent
/// unconditionally. Otherwise the reply is chosen dynamically: 331 when a
/// password is required (the default), 230 when not.
#[derive(Debug)]
pub struct UserCommandHandler {
    password_required: AtomicBool,
    reply_code_override: Mutex<Option<u16>>,
    invocations: InvocationLog,
}

impl Default for UserCommandHandler {
    fn default() -> Self {
        Self {
            password_required: AtomicBool::new(true),
            reply_code_override: Mutex::new(None),
            invocations: InvocationLog::new(),
        }
    }
}

impl UserCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_password_required(&self, required: bool) {
        self.password_required.store(required, Ordering::SeqCst);
    }

    /// Forces every invocation to answer with `code`, skipping the dynamic
    /// selection.
    pub fn set_reply_code(&self, code: u16) {
        *self.reply_code_override.lock().unwrap() = Some(code);
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl CommandHandler for UserCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command.name());
        let result: Result<(), HandlerError> = (|| {
            let username = command.required_parameter(0)?;
            record.set_text(USERNAME_KEY, username);
            session.set_pending_username(username);

            if let Some(code) = *self.reply_code_override.lock().unwrap() {
                return Ok(send_reply(session, config, code, None, &[])?);
            }

            if self.password_required.load(Ordering::SeqCst) {
                send_reply(
                    session,
                    config,
                    replies::PASSWORD_REQUIRED,
                    Some("user.needPassword"),
                    &[],
                )?;
            } else {
                send_reply(
                    session,
                    config,
                    replies::LOGIN_SUCCESS,
                    Some("user.loggedIn"),
                    &[],
                )?;
            }
            Ok(())
        })();
        self.invocations.append(record);
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles PASS: validates the account named by the pending username and
/// completes the login on success.
#[derive(Debug, Default)]
pub struct PassCommandHandler {
    invocations: InvocationLog,
}

impl PassCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> &InvocationLog {
        &self.invocations
    }
}

impl CommandHandler for PassCommandHandler {
    fn handle(
        &self,
        command: &Command,
        session: &mut dyn Session,
        config: &ServerConfig,
    ) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command.name());
        let result: Result<(), HandlerError> = (|| {
            let password = command.required_parameter(0)?.to_string();
            record.set_text(PASSWORD_KEY, &password);

            let username = session
                .pending_username()
                .map(str::to_string)
                .ok_or_else(|| {
                    CommandError::IllegalState("required username is missing".to_string())
                })?;

            if !validate_user_account(&username, session, config)? {
                return Ok(());
            }

            if let Some(account) = config.user_account(&username).cloned() {
                if account.account_required_for_login() {
                    send_reply(
                        session,
                        config,
                        replies::ACCOUNT_REQUIRED,
                        Some("pass.needAccount"),
                        &[],
                    )?;
                } else if account.is_valid_password(&password) {
                    login(&account, session, config, replies::LOGIN_SUCCESS, "pass")?;
                } else {
                    send_reply(
                        session,
                        config,
                        replies::NOT_LOGGED_IN,
                        Some("pass.loginFailed"),
                        &[],
                    )?;
                }
            }
            Ok(())
        })();
        self.invocations.append(record);
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserAccount;
    use crate::client::stub::StubSession;
    use crate::protocol::command::parse_command;
    use crate::storage::filesystem::FileEntry;
    use crate::storage::memory::InMemoryFileSystem;
    use std::sync::Arc;

    fn config_with_account(account: UserAccount) -> ServerConfig {
        let fs = InMemoryFileSystem::new();
        fs.add(FileEntry::directory(account.home_directory()));
        let mut config = ServerConfig::default();
        config.set_file_system(Arc::new(fs));
        config.add_user_account(account);
        config
    }

    #[test]
    fn test_user_password_required_replies_331() {
        let handler = UserCommandHandler::new();
        let mut session = StubSession::new();
        let config = ServerConfig::default();

        handler
            .handle(&parse_command("USER bob"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![331]);
        assert_eq!(session.pending_username(), Some("bob"));
        let record = handler.invocations().get(0).unwrap();
        assert_eq!(record.text(USERNAME_KEY), Some("bob"));
    }

    #[test]
    fn test_user_password_not_required_replies_230() {
        let handler = UserCommandHandler::new();
        handler.set_password_required(false);
        let mut session = StubSession::new();
        let config = ServerConfig::default();

        handler
            .handle(&parse_command("USER bob"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![230]);
    }

    #[test]
    fn test_user_reply_code_override_wins() {
        let handler = UserCommandHandler::new();
        handler.set_password_required(false);
        handler.set_reply_code(530);
        let mut session = StubSession::new();
        let config = ServerConfig::default();

        handler
            .handle(&parse_command("USER bob"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![530]);
    }

    #[test]
    fn test_user_without_username_is_syntax_error() {
        let handler = UserCommandHandler::new();
        let mut session = StubSession::new();
        let config = ServerConfig::default();

        let result = handler.handle(&parse_command("USER"), &mut session, &config);
        assert!(matches!(
            result,
            Err(HandlerError::Command(CommandError::Syntax))
        ));
        // The invocation is still recorded.
        assert_eq!(handler.invocations().len(), 1);
    }

    #[test]
    fn test_pass_without_user_is_illegal_state() {
        let handler = PassCommandHandler::new();
        let mut session = StubSession::new();
        let config = ServerConfig::default();

        let result = handler.handle(&parse_command("PASS pw"), &mut session, &config);
        assert!(matches!(
            result,
            Err(HandlerError::Command(CommandError::IllegalState(_)))
        ));
    }

    #[test]
    fn test_pass_logs_in_with_correct_password() {
        let handler = PassCommandHandler::new();
        let config = config_with_account(UserAccount::new("joe", "secret", "/home/joe"));
        let mut session = StubSession::new();
        session.set_pending_username("joe");

        handler
            .handle(&parse_command("PASS secret"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![230]);
        assert_eq!(session.user_account().unwrap().username(), "joe");
        assert_eq!(session.current_directory(), Some("/home/joe"));
        let record = handler.invocations().get(0).unwrap();
        assert_eq!(record.text(PASSWORD_KEY), Some("secret"));
    }

    #[test]
    fn test_pass_rejects_wrong_password() {
        let handler = PassCommandHandler::new();
        let config = config_with_account(UserAccount::new("joe", "secret", "/home/joe"));
        let mut session = StubSession::new();
        session.set_pending_username("joe");

        handler
            .handle(&parse_command("PASS nope"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![530]);
        assert!(session.user_account().is_none());
    }

    #[test]
    fn test_pass_unknown_account_replies_530() {
        let handler = PassCommandHandler::new();
        let config = ServerConfig::default();
        let mut session = StubSession::new();
        session.set_pending_username("ghost");

        handler
            .handle(&parse_command("PASS pw"), &mut session, &config)
            .unwrap();

        let (code, text) = session.last_reply().unwrap();
        assert_eq!(*code, 530);
        assert!(text.contains("ghost"));
    }

    #[test]
    fn test_pass_account_required_replies_332() {
        let mut account = UserAccount::new("joe", "secret", "/home/joe");
        account.set_account_required_for_login(true);
        let handler = PassCommandHandler::new();
        let config = config_with_account(account);
        let mut session = StubSession::new();
        session.set_pending_username("joe");

        handler
            .handle(&parse_command("PASS secret"), &mut session, &config)
            .unwrap();

        assert_eq!(session.reply_codes(), vec![332]);
        assert!(session.user_account().is_none());
    }
}
