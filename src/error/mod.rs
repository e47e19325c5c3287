//! Error handling
//!
//! Defines the recoverable protocol error set and the handler error wrapper.

pub mod types;

pub use types::{CommandError, HandlerError};
