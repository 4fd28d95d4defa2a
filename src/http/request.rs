use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use crate::http::encoding;
use crate::http::error::HttpError;
use crate::http::headers::Headers;

/// Key under which a trailing `*` route segment stores the matched suffix.
pub const WILDCARD_KEY: &str = "*";

/// HTTP request methods.
///
/// Routing only needs `GET` and `POST`, but the method token is free text:
/// anything unknown is kept verbatim as [`Method::Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
    Extension(String),
}

impl Method {
    /// Parses a method token. Case-sensitive, never fails.
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Extension("get".into()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values bound by the router: capture name to matched segment, plus
/// [`WILDCARD_KEY`] for a wildcard suffix.
pub type PathParams = HashMap<String, String>;

/// A parsed HTTP request.
///
/// `body` holds the bytes exactly as received until the router decodes it
/// according to `Content-Encoding`; handlers always see the decoded form.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw request target, e.g. `/echo/abc`.
    pub path: String,
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
    pub params: PathParams,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
            params: PathParams::new(),
        })
    }
}

impl Request {
    /// Case-insensitive header lookup.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Parsed `Content-Length`, or 0 when missing or not a number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Value bound to `{name}` by the matched route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Suffix matched by a trailing `*` route segment.
    pub fn wildcard(&self) -> Option<&str> {
        self.param(WILDCARD_KEY)
    }

    /// Whether the client asked for the connection to be closed.
    pub fn wants_close(&self) -> bool {
        self.headers.has_token("Connection", "close")
    }

    /// Replaces the raw body with its `Content-Encoding` decoded form and
    /// drops the header, since the body is no longer encoded.
    pub fn decode_body(&mut self) -> Result<(), HttpError> {
        let decoder = encoding::request_decoder(self.header("Content-Encoding"))?;
        if decoder.name() != encoding::IDENTITY {
            self.body = Bytes::from(decoder.decode(&self.body)?);
            self.headers.remove("Content-Encoding");
        }
        Ok(())
    }
}
