use courier::http::request::Request;
use courier::http::response::Response;
use courier::http::router::Router;
use courier::http::writer::ResponseWriter;
use courier::server;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

async fn start() -> std::net::SocketAddr {
    let mut router = Router::new();
    router.get("/", |r: &Request, w: &mut ResponseWriter| {
        w.respond(r, Response::ok(""));
    });
    router.get("/user-agent", |r: &Request, w: &mut ResponseWriter| {
        let agent = r.header("User-Agent").unwrap_or_default().to_string();
        w.respond(r, Response::ok(agent));
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, router));
    addr
}

async fn read_response(reader: &mut BufReader<TcpStream>) -> (String, Vec<u8>) {
    let mut head = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        if let Some(v) = line.strip_prefix("content-length: ") {
            content_length = v.trim().parse().unwrap();
        }
        head.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await.unwrap();
    (head, body)
}

#[tokio::test]
async fn test_keep_alive_over_tcp() {
    let addr = start().await;
    let mut stream = BufReader::new(TcpStream::connect(addr).await.unwrap());

    stream
        .get_mut()
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let (head, body) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("connection: keep-alive\r\n"));
    assert!(body.is_empty());

    stream
        .get_mut()
        .write_all(b"GET /user-agent HTTP/1.1\r\nUser-Agent: curl/8.0\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let (head, body) = read_response(&mut stream).await;
    assert!(head.contains("connection: close\r\n"));
    assert_eq!(body, b"curl/8.0");

    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn test_concurrent_connections() {
    let addr = start().await;

    // An idle connection must not block others.
    let _idle = TcpStream::connect(addr).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let mut stream = BufReader::new(TcpStream::connect(addr).await.unwrap());
            let req = format!("GET /user-agent HTTP/1.1\r\nUser-Agent: client-{i}\r\n\r\n");
            stream.get_mut().write_all(req.as_bytes()).await.unwrap();
            let (_, body) = read_response(&mut stream).await;
            assert_eq!(body, format!("client-{i}").into_bytes());
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
}
