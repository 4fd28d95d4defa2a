//! Courier - a small HTTP/1.1 server
//!
//! Hand-rolled request parsing, path-pattern routing, gzip negotiation and
//! keep-alive connections on top of tokio.

pub mod config;
pub mod files;
pub mod http;
pub mod server;
