//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use web_scaffold::config::{ConfigMap, SharedConfig};
use web_scaffold::{Server, Shutdown};

pub const TEST_SECRET: &str = "integration-secret";

/// A config whose static files live under `static_root` and whose API
/// endpoint is `api_endpoint`.
pub fn test_config(static_root: &Path, api_endpoint: &str) -> SharedConfig {
    let mut config = ConfigMap::default();
    config.api.api_secret = TEST_SECRET.into();
    config.api.api_endpoint = api_endpoint.into();
    config.app.static_root = static_root.display().to_string();
    SharedConfig::new(config)
}

/// Serve `server` on an ephemeral port. Keep the returned `Shutdown`
/// alive for as long as the server should run.
pub async fn spawn_server(server: Server) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// Start a programmable mock upstream on an ephemeral port. `f` maps each
/// request to a status code and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(SeenRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(seen) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(seen).await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request with a `Content-Length` body.
async fn read_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut content_length = 0usize;
    let mut content_type = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(header_end + content_length);
    Some(SeenRequest {
        method,
        path,
        content_type,
        body: String::from_utf8_lossy(&buf[header_end..body_end]).into_owned(),
    })
}
