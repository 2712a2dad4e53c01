//! Shared utilities for integration testing: mock device backends and a
//! gateway spawner.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use rover_gateway::config::GatewayConfig;
use rover_gateway::{GatewayServer, Shutdown};

/// Read the HTTP request head and return its request line.
async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Start a mock device that records each request line and answers with a
/// fixed response.
pub async fn start_capture_backend(
    addr: SocketAddr,
    status: u16,
    body: &'static str,
) -> mpsc::UnboundedReceiver<String> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let request_line = read_request_line(&mut socket).await;
                        let _ = tx.send(request_line);

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
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

    rx
}

/// Start a mock device that accepts connections but never responds.
#[allow(dead_code)]
pub async fn start_hanging_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request_line(&mut socket).await;
                        // Hold the connection open without answering.
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock camera that writes the given chunks with delays between
/// them, then closes. `content_type` of None omits the header entirely,
/// like the deployed firmware does.
#[allow(dead_code)]
pub async fn start_stream_backend(
    addr: SocketAddr,
    content_type: Option<&'static str>,
    chunks: Vec<(u64, &'static [u8])>,
) {
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let chunks = chunks.clone();
                    tokio::spawn(async move {
                        let _ = read_request_line(&mut socket).await;

                        let mut head = String::from("HTTP/1.1 200 OK\r\nConnection: close\r\n");
                        if let Some(ct) = content_type {
                            head.push_str(&format!("Content-Type: {}\r\n", ct));
                        }
                        head.push_str("\r\n");
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.flush().await;

                        for (delay_ms, chunk) in chunks {
                            if delay_ms > 0 {
                                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                            }
                            if socket.write_all(chunk).await.is_err() {
                                return;
                            }
                            let _ = socket.flush().await;
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock camera that streams a chunk every 50ms forever. The
/// returned flag flips to true once the gateway side of the connection has
/// gone away (the write fails).
#[allow(dead_code)]
pub async fn start_endless_stream_backend(addr: SocketAddr) -> Arc<AtomicBool> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let flag = flag.clone();
                    tokio::spawn(async move {
                        let _ = read_request_line(&mut socket).await;

                        let head = "HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n";
                        if socket.write_all(head.as_bytes()).await.is_err() {
                            flag.store(true, Ordering::SeqCst);
                            return;
                        }

                        loop {
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            if socket.write_all(b"--frame--").await.is_err()
                                || socket.flush().await.is_err()
                            {
                                flag.store(true, Ordering::SeqCst);
                                return;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    closed
}

/// Spawn a gateway on `proxy_addr` pointed at the given device addresses.
/// Returns the shutdown handle; drop or trigger it to stop the server.
pub async fn spawn_gateway(
    proxy_addr: SocketAddr,
    controller: &str,
    camera: &str,
) -> Shutdown {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = proxy_addr.to_string();
    config.upstreams.controller = controller.to_string();
    config.upstreams.camera = camera.to_string();
    // Short timeouts keep failure tests fast.
    config.timeouts.connect_secs = 2;
    config.timeouts.idle_secs = 3;

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config);
    let listener = TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the server a moment to start accepting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown
}

/// A reqwest client that never reuses connections between requests.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
