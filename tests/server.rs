//! End-to-end tests driving the server over real TCP connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use paperd::handler::{HandlerError, handler_fn};
use paperd::protocol::Request;
use paperd::protocol::response::{self, Response};
use paperd::router::Router;
use paperd::server::{Server, ServerHandle};

fn test_router() -> Router {
    Router::builder()
        .route(
            "/api/documents/{id}",
            Method::GET,
            handler_fn(|req: Request| async move {
                let id = req.param("id").unwrap_or("?").to_string();
                let verbose = req.query().get("verbose").unwrap_or("0").to_string();
                let body = format!("id={id} verbose={verbose}");
                Ok::<Response, HandlerError>(response::text(StatusCode::OK, body.into_bytes()))
            }),
        )
        .route(
            "/echo",
            Method::POST,
            handler_fn(|req: Request| async move {
                Ok::<Response, HandlerError>(response::text(StatusCode::OK, req.into_body()))
            }),
        )
        .route(
            "/boom",
            Method::GET,
            handler_fn(|_req: Request| async move { Err::<Response, HandlerError>("backend exploded".into()) }),
        )
        .route(
            "/slow",
            Method::GET,
            handler_fn(|_req: Request| async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok::<Response, HandlerError>(response::text(StatusCode::OK, "slow done"))
            }),
        )
        .build()
}

async fn start_server() -> (SocketAddr, ServerHandle, JoinHandle<()>) {
    let server = Server::builder()
        .address("127.0.0.1:0")
        .unwrap()
        .router(test_router())
        .build()
        .unwrap();

    let bound = server.bind().await.unwrap();
    let addr = bound.local_addr().unwrap();
    let handle = bound.handle();
    let join = tokio::spawn(bound.serve());
    (addr, handle, join)
}

/// Writes one raw request and reads the whole response (the server
/// half-closes its write side after flushing).
async fn send(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn health_check_bypasses_the_router() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.contains(r#""status": "healthy""#));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn routed_handler_sees_params_and_query() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "GET /api/documents/42?verbose=1 HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.ends_with("id=42 verbose=1"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn request_body_reaches_the_handler() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "POST /echo HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world").await;
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.ends_with("hello world"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn unknown_path_yields_404() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "GET /nope HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 404 Not Found\r\n"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn handler_failure_yields_500() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "GET /boom HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn malformed_request_gets_best_effort_400() {
    let (addr, handle, join) = start_server().await;

    let wire = send(addr, "total garbage not-http\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn bind_error_when_port_is_taken() {
    let (addr, handle, join) = start_server().await;

    let second = Server::builder()
        .address(addr)
        .unwrap()
        .router(test_router())
        .build()
        .unwrap();
    assert!(second.bind().await.is_err());

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn failing_session_does_not_disturb_others() {
    let (addr, handle, join) = start_server().await;

    // a connection that dies mid-request
    let mut broken = TcpStream::connect(addr).await.unwrap();
    broken.write_all(b"GET /api/docu").await.unwrap();
    drop(broken);

    // a concurrent healthy connection still completes its cycle
    let wire = send(addr, "GET /api/documents/7 HTTP/1.1\r\n\r\n").await;
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn stop_with_no_sessions_completes() {
    let (_addr, handle, join) = start_server().await;

    handle.stop().await;
    join.await.unwrap();
}

#[tokio::test]
async fn stop_drains_in_flight_sessions() {
    let (addr, handle, join) = start_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /slow HTTP/1.1\r\n\r\n").await.unwrap();

    // let the session reach its handler before requesting shutdown
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stopper = tokio::spawn(async move {
        handle.stop().await;
    });

    // the in-flight session still delivers its full response
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let wire = String::from_utf8(buf).unwrap();
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.ends_with("slow done"));

    stopper.await.unwrap();
    join.await.unwrap();

    // the listener is gone: no new connections are accepted
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (_addr, handle, join) = start_server().await;

    handle.stop().await;
    handle.stop().await;
    join.await.unwrap();
}
