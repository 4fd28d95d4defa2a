use std::io::Write;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::http::encoding;
use crate::http::error::HttpError;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Turns a handler's response into exactly what goes on the wire for
/// `request`.
///
/// Handler headers override the defaults. A non-empty body is encoded with
/// the coding negotiated from `Accept-Encoding` and `Content-Length` is set
/// to the encoded size. `Connection: close` on the request is mirrored.
pub fn finalize(request: &Request, response: Response) -> Result<Response, HttpError> {
    let mut headers = Headers::response_defaults();
    for (name, value) in response.headers.iter() {
        headers.replace(name, value);
    }

    let mut body = response.body;
    if !body.is_empty() {
        let encoder = encoding::negotiate(request.header("Accept-Encoding"));
        if encoder.name() != encoding::IDENTITY {
            body = Bytes::from(encoder.encode(&body)?);
            headers.replace("Content-Encoding", encoder.name());
        }
        headers.replace("Content-Length", body.len().to_string());
    }

    if request.wants_close() {
        headers.replace("Connection", "close");
    }

    Ok(Response {
        status: response.status,
        headers,
        body,
    })
}

/// Writes status line, headers, separator and body to `sink`, in that order.
///
/// Each piece is its own write; a failure stops the sequence and whatever
/// was already written stays written.
pub fn write_response<W: Write>(sink: &mut W, response: &Response) -> std::io::Result<()> {
    write!(
        sink,
        "{} {} {}\r\n",
        HTTP_VERSION,
        response.status.as_u16(),
        response.status.reason_phrase()
    )?;

    for (name, value) in response.headers.iter() {
        write!(sink, "{name}: {value}\r\n")?;
    }

    sink.write_all(b"\r\n")?;
    sink.write_all(&response.body)?;
    Ok(())
}

/// The sink handlers answer through.
///
/// Responses are serialized into a pending buffer which the connection
/// then flushes to the socket with [`ResponseWriter::write_to_stream`].
#[derive(Debug, Default)]
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    close: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `response` as the answer to `request`.
    pub fn send(&mut self, request: &Request, response: Response) -> Result<(), HttpError> {
        let response = finalize(request, response)?;
        write_response(&mut self.buffer, &response)?;

        if response.headers.has_token("Connection", "close") {
            self.close = true;
        }
        Ok(())
    }

    /// Like [`send`](Self::send), but logs failures instead of returning
    /// them. Handlers have no error channel, so this is what they call.
    pub fn respond(&mut self, request: &Request, response: Response) {
        if let Err(e) = self.send(request, response) {
            error!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "Failed to build response"
            );
        }
    }

    /// Whether a response sent through this writer announced
    /// `Connection: close`.
    pub fn closes_connection(&self) -> bool {
        self.close
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes serialized so far, flushed or not.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> Result<(), HttpError>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                )
                .into());
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
