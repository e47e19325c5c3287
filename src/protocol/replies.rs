//! FTP reply handling
//!
//! Reply code constants, control-connection reply formatting, and the
//! reply-text catalog mapping message keys to positional templates.

use std::collections::HashMap;

use log::warn;

/// Standard FTP reply codes used by this server.
pub const TRANSFER_DATA_START: u16 = 150;
pub const OK: u16 = 200;
pub const HELP_OK: u16 = 214;
pub const SYSTEM_TYPE: u16 = 215;
pub const READY: u16 = 220;
pub const CLOSING_CONNECTION: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const EXTENDED_PASSIVE_MODE: u16 = 229;
pub const LOGIN_SUCCESS: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATHNAME_CREATED: u16 = 257;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const ACCOUNT_REQUIRED: u16 = 332;
pub const FILE_ACTION_PENDING: u16 = 350;
pub const SYNTAX_ERROR: u16 = 502;
pub const BAD_SEQUENCE: u16 = 503;
pub const NOT_LOGGED_IN: u16 = 530;
pub const FILE_ERROR: u16 = 550;
pub const FILENAME_NOT_VALID: u16 = 553;

/// Catalog key consulted when no other key yields a template.
pub const INTERNAL_ERROR_KEY: &str = "internalError";

/// Formats a full reply payload for the control connection.
///
/// Single-line text renders as `CODE text\r\n`. Text containing newlines
/// renders with the multi-line continuation convention: the first line is
/// `CODE-text`, middle lines are sent bare, and the last line repeats the
/// code followed by a space.
pub fn format_reply(code: u16, text: &str) -> String {
    if text.is_empty() {
        return format!("{}\r\n", code);
    }

    let mut lines = text.lines();
    let first = lines.next().unwrap_or("");
    let rest: Vec<&str> = lines.collect();

    if rest.is_empty() {
        return format!("{} {}\r\n", code, first);
    }

    let mut reply = format!("{}-{}\r\n", code, first);
    for line in &rest[..rest.len() - 1] {
        reply.push_str(line);
        reply.push_str("\r\n");
    }
    reply.push_str(&format!("{} {}\r\n", code, rest[rest.len() - 1]));
    reply
}

/// Reply-text catalog: message key to template with positional `{0}`, `{1}`
/// placeholders.
#[derive(Debug, Clone)]
pub struct ReplyCatalog {
    entries: HashMap<String, String>,
}

impl Default for ReplyCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            entries: HashMap::new(),
        };

        for (key, template) in DEFAULT_REPLY_TEXT {
            catalog.set(key, template);
        }
        catalog
    }
}

impl ReplyCatalog {
    /// Returns the raw template for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or replaces the template for `key`.
    pub fn set(&mut self, key: &str, template: &str) {
        self.entries.insert(key.to_string(), template.to_string());
    }

    /// Resolves the text for a reply.
    ///
    /// Lookup chain: `message_key` when supplied, else the decimal reply
    /// code, else the internal-error key. A miss at the end of the chain
    /// logs a warning and yields empty text.
    pub fn text_for(&self, code: u16, message_key: Option<&str>, args: &[&str]) -> String {
        let code_key = code.to_string();
        let key = message_key.unwrap_or(&code_key);

        let template = self
            .get(key)
            .or_else(|| self.get(&code_key))
            .or_else(|| self.get(INTERNAL_ERROR_KEY));

        match template {
            Some(template) => format_template(template, args),
            None => {
                warn!("No reply text defined for key [{}]", key);
                String::new()
            }
        }
    }
}

/// Substitutes positional `{n}` placeholders with `args`; placeholders
/// without a matching argument are left untouched.
fn format_template(template: &str, args: &[&str]) -> String {
    let mut text = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        text = text.replace(&format!("{{{}}}", i), arg);
    }
    text
}

const DEFAULT_REPLY_TEXT: &[(&str, &str)] = &[
    ("150", "File status okay; about to open data connection."),
    ("200", "Command okay."),
    ("214", "Help message."),
    ("215", "\"{0}\" system type."),
    ("220", "Service ready for new user."),
    ("221", "Service closing control connection."),
    (
        "226",
        "Closing data connection. Requested file action successful.",
    ),
    ("227", "Entering passive mode ({0})."),
    ("229", "Entering extended passive mode (|||{0}|)."),
    ("230", "User logged in, proceed."),
    ("250", "Requested file action okay, completed."),
    ("257", "\"{0}\" created."),
    ("331", "User name okay, need password."),
    ("332", "Need account for login."),
    ("350", "Requested file action pending further information."),
    ("502", "Command not implemented."),
    ("503", "Bad sequence of commands."),
    ("530", "Not logged in."),
    ("550", "File unavailable: [{0}]."),
    ("553", "[{0}] is not a valid file or directory name."),
    ("internalError", "Internal error."),
    ("help", "{0}"),
    ("help.noHelpTextDefined", "No help text defined for [{0}]."),
    ("pwd", "\"{0}\" is current directory."),
    ("user.loggedIn", "User logged in, proceed."),
    ("user.needPassword", "User name okay, need password."),
    ("pass", "User logged in, proceed."),
    ("pass.needAccount", "Need account for login."),
    ("pass.loginFailed", "Not logged in."),
    (
        "login.userAccountNotValid",
        "UserAccount missing or invalid for user [{0}].",
    ),
    (
        "login.homeDirectoryNotValid",
        "Home directory is not valid for user [{0}]: [{1}].",
    ),
    ("filesystem.doesNotExist", "[{0}] does not exist."),
    (
        "filesystem.cannotRead",
        "The current user does not have read permission for [{0}].",
    ),
    (
        "filesystem.cannotWrite",
        "The current user does not have write permission for [{0}].",
    ),
    (
        "filesystem.cannotExecute",
        "The current user does not have execute permission for [{0}].",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_line_reply() {
        assert_eq!(format_reply(200, "Command okay."), "200 Command okay.\r\n");
        assert_eq!(format_reply(230, ""), "230\r\n");
    }

    #[test]
    fn test_format_multi_line_reply() {
        let reply = format_reply(214, "first\nsecond\nthird");
        assert_eq!(reply, "214-first\r\nsecond\r\n214 third\r\n");
    }

    #[test]
    fn test_text_for_code_key() {
        let catalog = ReplyCatalog::default();
        assert_eq!(catalog.text_for(200, None, &[]), "Command okay.");
    }

    #[test]
    fn test_text_for_message_key_with_args() {
        let catalog = ReplyCatalog::default();
        assert_eq!(
            catalog.text_for(530, Some("login.userAccountNotValid"), &["bob"]),
            "UserAccount missing or invalid for user [bob]."
        );
        assert_eq!(
            catalog.text_for(530, Some("login.homeDirectoryNotValid"), &["bob", "/home/bob"]),
            "Home directory is not valid for user [bob]: [/home/bob]."
        );
    }

    #[test]
    fn test_text_for_missing_key_falls_back_to_code() {
        let catalog = ReplyCatalog::default();
        assert_eq!(catalog.text_for(230, Some("no.such.key"), &[]), "User logged in, proceed.");
    }

    #[test]
    fn test_text_for_unknown_code_is_empty() {
        let mut catalog = ReplyCatalog::default();
        catalog.entries.remove(INTERNAL_ERROR_KEY);
        assert_eq!(catalog.text_for(999, None, &[]), "");
    }

    #[test]
    fn test_set_overrides_template() {
        let mut catalog = ReplyCatalog::default();
        catalog.set("220", "Welcome to the test server.");
        assert_eq!(catalog.text_for(220, None, &[]), "Welcome to the test server.");
    }

    #[test]
    fn test_unmatched_placeholder_left_untouched() {
        let catalog = ReplyCatalog::default();
        assert_eq!(
            catalog.text_for(553, None, &[]),
            "[{0}] is not a valid file or directory name."
        );
    }
}
