use std::io;
use thiserror::Error;

/// Everything that can go wrong while reading, dispatching or writing one
/// HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("invalid content-length header: {value:?}")]
    InvalidContentLength { value: String },

    #[error("truncated body: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    #[error("connection closed in the middle of a request")]
    UnexpectedEof,

    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unable to decode request body: {0}")]
    Decode(#[source] io::Error),

    #[error("unable to encode response body: {0}")]
    EncodeFailure(#[source] io::Error),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn malformed_header<S: ToString>(line: S) -> Self {
        Self::MalformedHeader { line: line.to_string() }
    }

    /// Whether the connection has to be dropped after this error.
    ///
    /// Encoding problems on a request body leave the framing intact, so only
    /// that exchange is lost. Anything else means the byte stream can no
    /// longer be trusted.
    pub fn is_connection_fatal(&self) -> bool {
        !matches!(self, Self::UnsupportedEncoding(_) | Self::Decode(_))
    }
}
