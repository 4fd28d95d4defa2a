//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.1 server with support for keep-alive connections.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive header map with merge and replace semantics
//! - **`encoding`**: identity and gzip content codings, looked up by name
//! - **`parser`**: reads one request at a time off a buffered stream
//! - **`request`** / **`response`**: the message types handlers work with
//! - **`router`**: method and path-pattern dispatch to handlers
//! - **`writer`**: finalizes and serializes responses
//! - **`connection`**: the per-connection request/response state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Parse the next request
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route and run the handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! A parse or transport error at any point closes the connection without
//! a response.

pub mod connection;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;

pub use error::HttpError;
pub use headers::Headers;
pub use request::{Method, Request};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use router::{Handler, Router};
pub use writer::ResponseWriter;
