//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use wildcard_edge::config::EdgeConfig;
use wildcard_edge::http::HttpServer;
use wildcard_edge::lifecycle::Shutdown;

/// Start an origin that answers every request with its own request target as
/// the body, and echoes the Host and X-Forwarded-Host it saw as headers.
///
/// Returns the bound address and a hit counter.
pub async fn start_echo_origin() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(echo(socket));
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}

async fn echo(mut socket: TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let mut lines = head.split("\r\n");
    let target = lines
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .unwrap_or("")
        .to_string();

    let header = |name: &str| {
        head.split("\r\n")
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Seen-Host: {}\r\nX-Seen-Forwarded-Host: {}\r\nConnection: close\r\n\r\n{}",
        target.len(),
        header("host"),
        header("x-forwarded-host"),
        target
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// A running edge server bound to an ephemeral port.
pub struct TestEdge {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<EdgeConfig>,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

pub async fn start_edge(mut config: EdgeConfig, origin: SocketAddr) -> TestEdge {
    config.origin.address = origin.to_string();
    config.observability.metrics_enabled = false;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let handle = tokio::spawn(server.run(listener, config_updates, shutdown.signal()));

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestEdge {
        addr,
        shutdown,
        updates,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
