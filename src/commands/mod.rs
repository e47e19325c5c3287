//! Command handling
//!
//! The `CommandHandler` capability trait, the dispatcher translating
//! recoverable errors into replies, shared helper operations, the
//! invocation-record log, and the concrete handlers.

pub mod connection;
pub mod dispatcher;
pub mod invocation;
pub mod login;
pub mod simple;
pub mod support;
pub mod transfer;

pub use dispatcher::{CommandHandler, ReplySpec, dispatch, send_reply};
pub use invocation::{InvocationLog, InvocationRecord};
