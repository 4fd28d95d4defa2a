//! Incremental HTTP/1.1 request parser.
//!
//! Reads exactly one message from a buffered source and leaves the source
//! positioned on the first byte after its body, so the next call picks up
//! the following request on the same connection.

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::error::HttpError;
use crate::http::headers::Headers;
use crate::http::request::{Method, PathParams, Request};

const CRLF: &[u8] = b"\r\n";

enum ParseState {
    RequestLine,
    Headers(RequestHead),
    Body(RequestHead),
    Done(Request),
}

struct RequestHead {
    method: Method,
    path: String,
    version: String,
    headers: Headers,
}

/// Reads the next request from `reader`.
///
/// Returns `Ok(None)` when the peer closed the stream before sending
/// anything, which is the normal end of a keep-alive connection.
pub async fn parse_request<R>(reader: &mut R) -> Result<Option<Request>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut state = ParseState::RequestLine;

    loop {
        state = match state {
            ParseState::RequestLine => match read_line(reader).await? {
                None => return Ok(None),
                Some(line) => ParseState::Headers(parse_request_line(&line)?),
            },

            ParseState::Headers(mut head) => {
                let line = read_line(reader).await?.ok_or(HttpError::UnexpectedEof)?;
                if line.is_empty() {
                    ParseState::Body(head)
                } else {
                    let (name, value) = parse_header_line(&line)?;
                    head.headers.set(name, value);
                    ParseState::Headers(head)
                }
            }

            ParseState::Body(head) => {
                let body = read_body(reader, &head.headers).await?;
                ParseState::Done(Request {
                    method: head.method,
                    path: head.path,
                    version: head.version,
                    headers: head.headers,
                    body,
                    params: PathParams::new(),
                })
            }

            ParseState::Done(request) => return Ok(Some(request)),
        };
    }
}

/// Reads one CRLF-terminated line, without the terminator.
///
/// A bare `\n` is ordinary line content. `None` means EOF with nothing read;
/// EOF after a partial line is an error.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            return if line.is_empty() {
                Ok(None)
            } else {
                Err(HttpError::UnexpectedEof)
            };
        }
        if line.ends_with(CRLF) {
            line.truncate(line.len() - CRLF.len());
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}

fn parse_request_line(line: &str) -> Result<RequestHead, HttpError> {
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, path, version] = parts[..] else {
        return Err(HttpError::malformed_request_line(line));
    };

    if method.is_empty() || path.is_empty() || version.is_empty() {
        return Err(HttpError::malformed_request_line(line));
    }

    Ok(RequestHead {
        method: Method::from_token(method),
        path: path.to_string(),
        version: version.to_string(),
        headers: Headers::new(),
    })
}

fn parse_header_line(line: &str) -> Result<(&str, &str), HttpError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| HttpError::malformed_header(line))?;

    if name.is_empty() {
        return Err(HttpError::malformed_header(line));
    }

    Ok((name, value.strip_prefix(' ').unwrap_or(value)))
}

async fn read_body<R>(reader: &mut R, headers: &Headers) -> Result<Bytes, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let Some(raw) = headers.get("Content-Length") else {
        return Ok(Bytes::new());
    };
    let expected: usize = raw
        .trim()
        .parse()
        .map_err(|_| HttpError::InvalidContentLength { value: raw.to_string() })?;

    let mut body = Vec::with_capacity(expected);
    let received = (&mut *reader).take(expected as u64).read_to_end(&mut body).await?;
    if received < expected {
        return Err(HttpError::TruncatedBody { expected, received });
    }

    Ok(Bytes::from(body))
}
