//! Fake FTP server
//!
//! An in-process FTP server double for exercising FTP client code: real
//! control-connection protocol handling with configurable accounts, canned
//! file contents, and per-handler invocation records for test assertions.

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

pub use server::{RunningServer, Server};
