//! End-to-end tests over real TCP sockets

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use dfa_httpd::config::Config;
use dfa_httpd::error::{ExitStatus, StartupError};
use dfa_httpd::http::response::Outcome;
use dfa_httpd::server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn local_config(root: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.server.bind_addr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    cfg.server.port = 0;
    cfg.files.root = root.to_path_buf();
    cfg
}

async fn fetch(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();
    let mut received = Vec::new();
    stream.read_to_end(&mut received).await.unwrap();
    received
}

#[tokio::test]
async fn test_serve_once_returns_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), b"hi").unwrap();
    let cfg = local_config(dir.path());

    let listener = server::bind(&cfg.server).unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move { server::serve_once(&listener, Arc::new(cfg)).await });

    let received = fetch(addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert_eq!(received, b"HTTP/1.1 200 OK\nContent-Type: text/html\n\nhi".to_vec());
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::Served);
}

#[tokio::test]
async fn test_serve_once_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = local_config(dir.path());

    let listener = server::bind(&cfg.server).unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move { server::serve_once(&listener, Arc::new(cfg)).await });

    let received = fetch(addr, b"GET /nothing.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(
        received,
        b"HTTP/1.1 404 Not Found\n\n<b>404 Error - resource not found on this server</b>\n".to_vec()
    );
    assert_eq!(handle.await.unwrap().unwrap(), Outcome::NotFound);
}

#[tokio::test]
async fn test_serve_forever_handles_several_clients() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.html"), b"A").unwrap();
    std::fs::write(dir.path().join("b.html"), b"B").unwrap();
    let mut cfg = local_config(dir.path());
    cfg.server.max_connections = 2;

    let listener = server::bind(&cfg.server).unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server::serve_forever(listener, Arc::new(cfg)));

    let (a, b) = tokio::join!(
        fetch(addr, b"GET /a.html HTTP/1.1\r\n\r\n"),
        fetch(addr, b"GET /b.html HTTP/1.1\r\n\r\n")
    );
    let missing = fetch(addr, b"GET /c.html HTTP/1.1\r\n\r\n").await;

    assert!(a.ends_with(b"\n\nA"));
    assert!(b.ends_with(b"\n\nB"));
    assert!(missing.starts_with(b"HTTP/1.1 404 Not Found"));

    handle.abort();
}

#[tokio::test]
async fn test_bind_conflict_is_bind_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = local_config(dir.path());

    let first = server::bind(&cfg.server).unwrap();
    let mut taken = cfg.server.clone();
    taken.port = first.local_addr().unwrap().port();

    // Another listener on the same port with SO_REUSEADDR still may not bind
    // while the first one is listening
    let err = server::bind(&taken).unwrap_err();

    assert!(matches!(err, StartupError::Bind(_)));
    assert_eq!(err.exit_status(), ExitStatus::Bind);
}

#[tokio::test]
async fn test_run_once_maps_outcome_to_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), b"hi").unwrap();

    // Reserve a free port, release it, then hand it to run()
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let mut cfg = local_config(dir.path());
    cfg.server.port = port;
    let handle = tokio::spawn(server::run(cfg));

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
    let received = loop {
        match TcpStream::connect(addr).await {
            Ok(mut stream) => {
                stream.write_all(b"GET /missing HTTP/1.1\r\n\r\n").await.unwrap();
                let mut received = Vec::new();
                stream.read_to_end(&mut received).await.unwrap();
                break received;
            }
            Err(_) => tokio::task::yield_now().await,
        }
    };

    assert!(received.starts_with(b"HTTP/1.1 404 Not Found"));
    assert_eq!(handle.await.unwrap().unwrap(), ExitStatus::File);
}
