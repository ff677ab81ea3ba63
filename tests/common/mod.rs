//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tenant_gate::auth::{PasswordHasher, Role};
use tenant_gate::config::{GateConfig, UserRecord};
use tenant_gate::{GateServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a page backend that answers every request with
/// `"<x-gate-tenant> <request target>"`.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf);
                let target = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("?")
                    .to_string();
                let tenant = head
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("x-gate-tenant"))
                    .map(|(_, value)| value.trim().to_string())
                    .unwrap_or_else(|| "none".into());

                let body = format!("{tenant} {target}");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Config for `example.com` with one user of each role.
///
/// `ada` / `lovelace` is an interviewer, `alan` / `turing` a plain user.
pub fn gate_config(upstream: SocketAddr) -> GateConfig {
    let mut config = GateConfig::default();
    config.tenancy.root_domain = "example.com".into();
    config.upstream.address = upstream.to_string();

    let hasher = PasswordHasher::new(&config.auth.password_secret);
    config.users = vec![
        UserRecord {
            id: 1,
            email: "ada@example.com".into(),
            username: "ada".into(),
            password_hash: hasher.hash("lovelace"),
            role: Role::Interviewer,
        },
        UserRecord {
            id: 2,
            email: "alan@example.com".into(),
            username: "alan".into(),
            password_hash: hasher.hash("turing"),
            role: Role::User,
        },
    ];
    config
}

/// Run the gate on an ephemeral port. Returns its address and the shutdown
/// handle.
pub async fn start_gate(config: GateConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = GateServer::new(config).run(listener, rx).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

/// Client that never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
