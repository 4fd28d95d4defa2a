use courier::http::encoding::{Encoder, Gzip};
use courier::http::request::{Method, RequestBuilder};
use courier::http::HttpError;

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
    assert_eq!(req.version, "HTTP/1.1");
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}

#[test]
fn test_request_content_length() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Length", "42")
        .build()
        .unwrap();
    assert_eq!(req.content_length(), 42);

    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Length", "not-a-number")
        .build()
        .unwrap();
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_wants_close() {
    let close = RequestBuilder::new()
        .method(Method::GET)
        .path("/")
        .header("Connection", "close")
        .build()
        .unwrap();
    assert!(close.wants_close());

    let default = RequestBuilder::new().method(Method::GET).path("/").build().unwrap();
    assert!(!default.wants_close());
}

#[test]
fn test_params_start_empty() {
    let req = RequestBuilder::new().method(Method::GET).path("/").build().unwrap();

    assert_eq!(req.param("id"), None);
    assert_eq!(req.wildcard(), None);
}

#[test]
fn test_decode_gzip_body() {
    let compressed = Gzip.encode(b"payload").unwrap();
    let mut req = RequestBuilder::new()
        .method(Method::POST)
        .path("/files/x")
        .header("Content-Encoding", "gzip")
        .body(compressed)
        .build()
        .unwrap();

    req.decode_body().unwrap();

    assert_eq!(&req.body[..], b"payload");
    assert_eq!(req.header("Content-Encoding"), None);
}

#[test]
fn test_decode_unsupported_encoding() {
    let mut req = RequestBuilder::new()
        .method(Method::POST)
        .path("/")
        .header("Content-Encoding", "br")
        .body(&b"abc"[..])
        .build()
        .unwrap();

    assert!(matches!(req.decode_body(), Err(HttpError::UnsupportedEncoding(_))));
    assert_eq!(&req.body[..], b"abc");
}

#[test]
fn test_method_display() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(Method::Extension("PURGE".into()).to_string(), "PURGE");
}
