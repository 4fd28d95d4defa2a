use std::io::Read;
use std::sync::Arc;

use courier::http::HttpError;
use courier::http::connection::Connection;
use courier::http::request::Request;
use courier::http::response::Response;
use courier::http::router::Router;
use courier::http::writer::ResponseWriter;
use flate2::read::GzDecoder;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::task::JoinHandle;

fn router() -> Arc<Router> {
    let mut router = Router::new();
    router.get("/echo/{str}", |r: &Request, w: &mut ResponseWriter| {
        let s = r.param("str").unwrap_or_default().to_string();
        w.respond(r, Response::ok(s));
    });
    Arc::new(router)
}

/// Spawns a connection over an in-memory pipe and returns the client end.
fn connect() -> (DuplexStream, JoinHandle<Result<(), HttpError>>) {
    let (client, server) = duplex(64 * 1024);
    let router = router();
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, router);
        conn.run().await
    });
    (client, task)
}

/// Splits one response off the front of `raw`: (head, body, rest).
fn split_response(raw: &[u8]) -> (String, Vec<u8>, Vec<u8>) {
    let end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    let head = String::from_utf8(raw[..end].to_vec()).unwrap();
    let len: usize = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length: "))
        .unwrap()
        .parse()
        .unwrap();
    (head, raw[end..end + len].to_vec(), raw[end + len..].to_vec())
}

#[tokio::test]
async fn test_echo_with_gzip() {
    let (mut client, task) = connect();

    client
        .write_all(b"GET /echo/abc HTTP/1.1\r\nHost: x\r\nAccept-Encoding: gzip\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    task.await.unwrap().unwrap();

    let (head, body, rest) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("content-encoding: gzip\r\n"));
    assert!(head.contains("connection: close\r\n"));
    assert!(rest.is_empty());

    let mut decoded = String::new();
    GzDecoder::new(&body[..]).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, "abc");
}

#[tokio::test]
async fn test_keep_alive_serves_sequential_requests() {
    let (mut client, task) = connect();

    client
        .write_all(b"GET /echo/one HTTP/1.1\r\n\r\nGET /missing HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    client.shutdown().await.unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    task.await.unwrap().unwrap();

    let (first_head, first_body, rest) = split_response(&raw);
    assert!(first_head.contains("connection: keep-alive\r\n"));
    assert_eq!(first_body, b"one");

    let (second_head, second_body, rest) = split_response(&rest);
    assert!(second_head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(second_body.is_empty());
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_connection_close_stops_reading() {
    let (mut client, task) = connect();

    client
        .write_all(b"GET /echo/a HTTP/1.1\r\nConnection: close\r\n\r\nGET /echo/b HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    task.await.unwrap().unwrap();

    let (_, body, rest) = split_response(&raw);
    assert_eq!(body, b"a");
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_malformed_request_drops_connection_silently() {
    let (mut client, task) = connect();

    client.write_all(b"NONSENSE\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();

    assert!(raw.is_empty());
    assert!(matches!(
        task.await.unwrap(),
        Err(HttpError::MalformedRequestLine { .. })
    ));
}

#[tokio::test]
async fn test_premature_eof_is_an_error() {
    let (mut client, task) = connect();

    client
        .write_all(b"POST /echo/x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
        .await
        .unwrap();
    client.shutdown().await.unwrap();

    assert!(matches!(
        task.await.unwrap(),
        Err(HttpError::TruncatedBody { expected: 10, received: 3 })
    ));
}
