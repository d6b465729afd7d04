//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use faas_gateway::config::GatewayConfig;
use faas_gateway::lifecycle::startup;
use faas_gateway::resolver::StaticResolver;
use faas_gateway::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A request as seen by a mock watchdog.
#[derive(Debug, Clone)]
pub struct Received {
    pub head: String,
    pub body: Vec<u8>,
}

impl Received {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Raw HTTP/1.1 response text, or `None` to drop the connection.
pub type Responder = Arc<dyn Fn(&Received) -> Option<String> + Send + Sync>;

/// Start a mock watchdog on an ephemeral port and return its port.
pub async fn start_backend(respond: Responder) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let respond = respond.clone();
            tokio::spawn(async move {
                let Some(received) = read_request(&mut socket).await else {
                    return;
                };
                if let Some(response) = respond(&received) {
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });

    port
}

/// A watchdog that accepts connections and never answers.
pub async fn start_silent_backend() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    port
}

/// A watchdog that answers every request with `status` and `body`.
pub async fn start_mock_backend(status: &'static str, body: &'static str) -> u16 {
    start_backend(Arc::new(move |_| Some(response(status, &[], body)))).await
}

/// A watchdog that replies with the request line followed by the body.
pub async fn start_echo_backend() -> u16 {
    start_backend(Arc::new(|received| {
        let body = format!(
            "{}\n{}",
            received.request_line(),
            String::from_utf8_lossy(&received.body)
        );
        Some(response("200 OK", &[], &body))
    }))
    .await
}

pub fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut text = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (name, value) in headers {
        text.push_str(&format!("{}: {}\r\n", name, value));
    }
    text.push_str("\r\n");
    text.push_str(body);
    text
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<Received> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let mut received = Received {
        head,
        body: data[head_end..].to_vec(),
    };

    let length = received
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while received.body.len() < length {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => received.body.extend_from_slice(&buf[..n]),
        }
    }

    Some(received)
}

/// Config for a gateway on an ephemeral port whose functions all live on
/// `127.0.0.1:{watchdog_port}`.
pub fn gateway_config(watchdog_port: u16, functions: &[&str]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.watchdog_port = watchdog_port;
    config.upstream.dial_timeout_ms = Some(1_000);
    for name in functions {
        config
            .resolver
            .functions
            .insert(name.to_string(), "127.0.0.1".to_string());
    }
    config
}

/// A running gateway; stops when `shutdown` is triggered.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let resolver = Arc::new(StaticResolver::new(config.resolver.functions.clone()));
    let server = startup::build_server_with_resolver(config, resolver).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
