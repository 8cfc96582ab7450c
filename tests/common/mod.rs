//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use cep_resolver::config::ServiceConfig;
use cep_resolver::http::HttpServer;
use cep_resolver::lifecycle::Shutdown;

pub const BRASIL_API_BODY: &str = r#"{"cep":"01001000","state":"SP","city":"São Paulo","neighborhood":"Sé","street":"Praça da Sé","service":"open-cep"}"#;
pub const VIA_CEP_BODY: &str = r#"{"cep":"01001-000","logradouro":"Praça da Sé","complemento":"lado ímpar","bairro":"Sé","localidade":"São Paulo","uf":"SP","ibge":"3550308","gia":"1004","ddd":"11","siafi":"7107"}"#;

/// Consume the request head so closing the socket does not reset the client.
async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request target (path and query) and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
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
                        let head = read_request_head(&mut socket).await;
                        let target = head
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
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

/// Start a backend answering every request with `body` after `delay`.
pub async fn start_mock_backend(delay: Duration, status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move {
        tokio::time::sleep(delay).await;
        (status, body.to_string())
    })
    .await
}

/// An address nothing listens on; connecting is refused immediately.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing both providers at local backends.
pub fn test_config(brasil_api: SocketAddr, via_cep: SocketAddr, race_timeout_ms: u64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.race.timeout_ms = race_timeout_ms;
    config.http_client.system_proxy = false;
    config.observability.metrics_enabled = false;
    config.providers.brasil_api.base_url = Some(format!("http://{}", brasil_api));
    config.providers.via_cep.base_url = Some(format!("http://{}", via_cep));
    config
}

/// A running resolver. Dropping it does not stop the server; call `stop`.
pub struct Resolver {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl Resolver {
    pub fn url(&self, query: &str) -> String {
        format!("http://{}/{}", self.addr, query)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

pub async fn start_resolver(config: ServiceConfig) -> Resolver {
    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    Resolver {
        addr,
        shutdown,
        config_tx,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
