//! File permissions
//!
//! The user/group/world read/write/execute permission triple attached to
//! filesystem entries, stored as a nine-bit mask.

use std::fmt;

const USER_READ: u16 = 0o400;
const USER_WRITE: u16 = 0o200;
const USER_EXECUTE: u16 = 0o100;
const GROUP_READ: u16 = 0o040;
const GROUP_WRITE: u16 = 0o020;
const GROUP_EXECUTE: u16 = 0o010;
const WORLD_READ: u16 = 0o004;
const WORLD_WRITE: u16 = 0o002;
const WORLD_EXECUTE: u16 = 0o001;

/// A user/group/world × read/write/execute permission matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    bits: u16,
}

impl Permissions {
    /// All nine bits set (`rwxrwxrwx`).
    pub const ALL: Permissions = Permissions { bits: 0o777 };

    /// The default mask for newly created files (`rw-rw-rw-`).
    pub const DEFAULT_FILE: Permissions = Permissions { bits: 0o666 };

    /// Parses a `rwxrwxrwx` string, `-` marking an unset bit.
    pub fn parse(s: &str) -> Result<Self, String> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 9 {
            return Err(format!("Invalid permission string: {}", s));
        }

        let mut bits = 0u16;
        let expected = ['r', 'w', 'x', 'r', 'w', 'x', 'r', 'w', 'x'];
        for (i, (&c, &e)) in chars.iter().zip(expected.iter()).enumerate() {
            if c == e {
                bits |= 1 << (8 - i);
            } else if c != '-' {
                return Err(format!("Invalid permission string: {}", s));
            }
        }
        Ok(Self { bits })
    }

    pub fn user_can_read(&self) -> bool {
        self.bits & USER_READ != 0
    }

    pub fn user_can_write(&self) -> bool {
        self.bits & USER_WRITE != 0
    }

    pub fn user_can_execute(&self) -> bool {
        self.bits & USER_EXECUTE != 0
    }

    pub fn group_can_read(&self) -> bool {
        self.bits & GROUP_READ != 0
    }

    pub fn group_can_write(&self) -> bool {
        self.bits & GROUP_WRITE != 0
    }

    pub fn group_can_execute(&self) -> bool {
        self.bits & GROUP_EXECUTE != 0
    }

    pub fn world_can_read(&self) -> bool {
        self.bits & WORLD_READ != 0
    }

    pub fn world_can_write(&self) -> bool {
        self.bits & WORLD_WRITE != 0
    }

    pub fn world_can_execute(&self) -> bool {
        self.bits & WORLD_EXECUTE != 0
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = ['r', 'w', 'x', 'r', 'w', 'x', 'r', 'w', 'x'];
        for (i, &c) in expected.iter().enumerate() {
            let set = self.bits & (1 << (8 - i)) != 0;
            write!(f, "{}", if set { c } else { '-' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip() {
        for s in ["rw-rw-rw-", "rwxrwxrwx", "---------", "rwx------", "r--r--r--"] {
            let permissions = Permissions::parse(s).unwrap();
            assert_eq!(permissions.to_string(), s);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_strings() {
        assert!(Permissions::parse("rw-rw-rw").is_err());
        assert!(Permissions::parse("rw-rw-rw-x").is_err());
        assert!(Permissions::parse("qw-rw-rw-").is_err());
        assert!(Permissions::parse("").is_err());
    }

    #[test]
    fn test_bit_accessors() {
        let permissions = Permissions::parse("rwx------").unwrap();
        assert!(permissions.user_can_read());
        assert!(permissions.user_can_write());
        assert!(permissions.user_can_execute());
        assert!(!permissions.group_can_read());
        assert!(!permissions.world_can_execute());

        let permissions = Permissions::DEFAULT_FILE;
        assert!(permissions.user_can_write());
        assert!(permissions.group_can_read());
        assert!(permissions.world_can_write());
        assert!(!permissions.user_can_execute());
    }

    #[test]
    fn test_all_mask() {
        assert_eq!(Permissions::ALL.to_string(), "rwxrwxrwx");
    }
}
