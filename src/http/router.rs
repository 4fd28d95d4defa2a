//! Method and path based dispatch.
//!
//! Patterns are `/`-separated segments. A segment is either a literal,
//! a `{name}` capture matching any single segment, or a final `*` that
//! swallows the rest of the path. Routes are tried in registration order
//! and the first match wins.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::http::request::{Method, PathParams, Request, WILDCARD_KEY};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// A request handler. Whatever it sends through the writer is the response.
pub type Handler = Arc<dyn Fn(&Request, &mut ResponseWriter) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
    Wildcard,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "*" {
            Segment::Wildcard
        } else if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Segment::Capture(name.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }
}

pub struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handler: Handler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl Route {
    pub fn new(method: Method, pattern: &str, handler: Handler) -> Self {
        Self {
            method,
            pattern: pattern.to_string(),
            segments: pattern.split('/').map(Segment::parse).collect(),
            handler,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Matches `path` against this route's pattern, returning the bindings.
    ///
    /// `*` only has meaning as the last segment; the path may end right
    /// where it starts, in which case it binds the empty string.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').collect();
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    let rest = parts.get(i..).unwrap_or_default().join("/");
                    params.insert(WILDCARD_KEY.to_string(), rest);
                    return Some(params);
                }
                Segment::Capture(name) => {
                    params.insert(name.clone(), parts.get(i)?.to_string());
                }
                Segment::Literal(literal) => {
                    if parts.get(i)? != literal {
                        return None;
                    }
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

/// Ordered route table. Build it fully before serving; it is shared
/// read-only between connections afterwards.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.routes.push(Route::new(method, pattern, Arc::new(handler)));
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&Request, &mut ResponseWriter) + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route accepting `method` and `path`, with its bindings.
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| route.matches(path).map(|params| (route, params)))
    }

    /// Dispatches `request` and lets the matched handler answer through `w`.
    ///
    /// Unmatched requests get an empty 404. A body whose `Content-Encoding`
    /// can't be decoded gets an empty 500 and never reaches the handler.
    pub fn handle(&self, request: &mut Request, w: &mut ResponseWriter) {
        let Some((route, params)) = self.find(&request.method, &request.path) else {
            debug!(method = %request.method, path = %request.path, "No route matched");
            w.respond(request, Response::not_found());
            return;
        };

        request.params = params;

        if let Err(e) = request.decode_body() {
            warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "Rejecting request body"
            );
            w.respond(request, Response::internal_error());
            return;
        }

        debug!(
            method = %request.method,
            path = %request.path,
            route = route.pattern(),
            "Dispatching request"
        );
        (route.handler)(&*request, w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        Arc::new(|_: &Request, _: &mut ResponseWriter| {})
    }

    #[test]
    fn pattern_segments() {
        let route = Route::new(Method::GET, "/files/{name}/*", noop());
        assert_eq!(
            route.segments,
            vec![
                Segment::Literal(String::new()),
                Segment::Literal("files".into()),
                Segment::Capture("name".into()),
                Segment::Wildcard,
            ]
        );
    }

    #[test]
    fn root_matches_only_root() {
        let route = Route::new(Method::GET, "/", noop());
        assert!(route.matches("/").is_some());
        assert!(route.matches("/a").is_none());
        assert!(route.matches("").is_none());
    }

    #[test]
    fn wildcard_may_be_empty() {
        let route = Route::new(Method::GET, "/files/*", noop());
        assert_eq!(route.matches("/files").unwrap()["*"], "");
        assert_eq!(route.matches("/files/").unwrap()["*"], "");
    }
}
