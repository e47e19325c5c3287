//! Server façade
//!
//! The handler registry, the configuration surface handlers read, and the
//! thread-per-connection runtime.

pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::{RunningServer, Server};
