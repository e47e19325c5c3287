//! Authentication system
//!
//! User accounts, credential validation, and per-entry permission checks.

pub mod account;

pub use account::UserAccount;
