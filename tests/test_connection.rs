use std::sync::Arc;
use std::time::Duration;

use taco_http::http::connection::{Connection, ConnectionError};
use taco_http::http::headers::Headers;
use taco_http::http::parser::ParseError;
use taco_http::http::request::Method;
use taco_http::http::response::Response;
use taco_http::routing::{uri_mapping, uri_variable_mapping, Router};
use taco_http::server::Dispatcher;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

struct RawResponse {
    head: String,
    body: Vec<u8>,
}

impl RawResponse {
    fn status_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(": ")?;
            key.eq_ignore_ascii_case(name).then_some(value)
        })
    }
}

fn router() -> Router {
    let mut router = Router::new();
    router.register_fn(uri_mapping("/api/ping", Method::GET), |_ctx| async {
        Ok::<_, anyhow::Error>(Response::text("pong"))
    });
    router.register_fn(uri_mapping("/boom", Method::GET), |_ctx| async {
        Err::<(), _>(anyhow::anyhow!("boom"))
    });
    router.register_fn(
        uri_variable_mapping("/echo/{word}", Method::POST).unwrap(),
        |ctx| async move {
            let word = ctx.uri_variables().get("word").unwrap_or_default().to_string();
            let body = ctx.raw_body().cloned().unwrap_or_default();
            Ok::<_, anyhow::Error>(Response::ok([word.as_bytes(), &b":"[..], &body[..]].concat()))
        },
    );
    router
}

fn serve(read_timeout: Duration) -> (DuplexStream, JoinHandle<Result<(), ConnectionError>>) {
    let mut defaults = Headers::new();
    defaults.add("Server", "taco-http");
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(router()), defaults));

    let (client, server) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, dispatcher, read_timeout);
        conn.run().await
    });
    (client, task)
}

async fn read_response(client: &mut DuplexStream) -> RawResponse {
    let mut buf = Vec::new();
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let mut chunk = [0u8; 1024];
        let n = client.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response head");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut response = RawResponse {
        head,
        body: buf[head_end + 4..].to_vec(),
    };

    let length: usize = response.header("Content-Length").unwrap().parse().unwrap();
    while response.body.len() < length {
        let mut chunk = [0u8; 1024];
        let n = client.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response body");
        response.body.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(response.body.len(), length);
    response
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_serves_request_and_sets_content_length() {
    let (mut client, _task) = serve(TIMEOUT);

    client
        .write_all(b"POST /echo/hola HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\ntacos")
        .await
        .unwrap();

    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.header("Content-Length"), Some("10"));
    assert_eq!(response.header("Server"), Some("taco-http"));
    assert_eq!(response.body, b"hola:tacos");
}

#[tokio::test]
async fn test_leading_double_slash_is_collapsed() {
    let (mut client, _task) = serve(TIMEOUT);

    client
        .write_all(b"GET //api/ping HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"pong");
}

#[tokio::test]
async fn test_handler_failure_does_not_end_connection() {
    let (mut client, _task) = serve(TIMEOUT);

    client.write_all(b"GET /boom HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 500 Internal Server Error");

    client.write_all(b"GET /api/ping HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"pong");
}

#[tokio::test]
async fn test_unknown_route_is_404_and_connection_stays_open() {
    let (mut client, _task) = serve(TIMEOUT);

    client.write_all(b"GET /nope HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 404 Not Found");
    assert_eq!(response.header("Server"), Some("taco-http"));

    client.write_all(b"GET /api/ping HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(read_response(&mut client).await.body, b"pong");
}

#[tokio::test]
async fn test_pipelined_requests_are_answered_in_order() {
    let (mut client, _task) = serve(TIMEOUT);

    client
        .write_all(b"GET /boom HTTP/1.1\r\n\r\nGET /api/ping HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    assert_eq!(
        read_response(&mut client).await.status_line(),
        "HTTP/1.1 500 Internal Server Error"
    );
    assert_eq!(read_response(&mut client).await.body, b"pong");
}

#[tokio::test]
async fn test_connection_close_header_ends_connection() {
    let (mut client, task) = serve(TIMEOUT);

    client
        .write_all(b"GET /api/ping HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let response = read_response(&mut client).await;
    assert_eq!(response.header("Connection"), Some("close"));

    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_unknown_method_is_404_and_connection_stays_open() {
    let (mut client, _task) = serve(TIMEOUT);

    client.write_all(b"PURGE /api/ping HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 404 Not Found");
    assert_eq!(response.header("Connection"), None);

    client.write_all(b"GET /api/ping HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(response.body, b"pong");
}

#[tokio::test]
async fn test_malformed_request_gets_400_and_closes() {
    let (mut client, task) = serve(TIMEOUT);

    client.write_all(b"GE(T /pot HTTP/1.1\r\n\r\n").await.unwrap();

    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 400 Bad Request");
    assert_eq!(response.header("Connection"), Some("close"));

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, ConnectionError::Parse(ParseError::InvalidMethod)));
    assert!(!err.is_expected());
}

#[tokio::test]
async fn test_oversized_body_gets_413_and_closes() {
    let (mut client, task) = serve(TIMEOUT);

    client
        .write_all(b"POST /echo/big HTTP/1.1\r\nContent-Length: 99999999999\r\n\r\n")
        .await
        .unwrap();

    let response = read_response(&mut client).await;
    assert_eq!(response.status_line(), "HTTP/1.1 413 Content Too Large");
    assert_eq!(response.header("Connection"), Some("close"));

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, ConnectionError::Parse(ParseError::BodyTooLarge)));
}

#[tokio::test]
async fn test_client_hangup_between_requests_is_clean() {
    let (mut client, task) = serve(TIMEOUT);

    client.write_all(b"GET /api/ping HTTP/1.1\r\n\r\n").await.unwrap();
    read_response(&mut client).await;
    drop(client);

    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_hangup_mid_request_is_unexpected_eof() {
    let (mut client, task) = serve(TIMEOUT);

    client.write_all(b"GET /api/ping HTTP/1.1\r\nHost: loc").await.unwrap();
    drop(client);

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, ConnectionError::UnexpectedEof));
    assert!(err.is_expected());
}

#[tokio::test]
async fn test_idle_connection_times_out() {
    let (_client, task) = serve(Duration::from_millis(50));

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, ConnectionError::ReadTimeout));
    assert!(err.is_expected());
}
