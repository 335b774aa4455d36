//! TCP connect probe.
//!
//! Performs a full handshake through the operating system's socket API.
//! No elevated privileges are needed.

use crate::error::ProbeFailure;
use crate::scanner::traits::Probe;
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::trace;

/// Probe that opens (and immediately drops) a TCP connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProbe;

impl TcpConnectProbe {
    /// Resolve `host` and connect to the first address that accepts.
    ///
    /// Resolution is not covered by `connect_timeout`; the handshakes are.
    async fn attempt_connect(
        &self,
        host: &str,
        port: Port,
        connect_timeout: Duration,
    ) -> Result<TcpStream, ProbeFailure> {
        let addrs = resolve(host, port).await?;
        connect_any(&addrs, connect_timeout).await
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    async fn probe(&self, host: &str, port: Port, connect_timeout: Duration) -> bool {
        let outcome = self.attempt_connect(host, port, connect_timeout).await;
        if let Err(ref reason) = outcome {
            trace!(%host, %port, %reason, "probe failed");
        }
        normalize(outcome)
    }
}

/// Collapse a connection outcome into open/closed.
///
/// This deliberately loses information: a refused port, a silent firewall,
/// an unreachable network and an unresolvable name all read as closed. The
/// stream, if any, is dropped here, which closes the socket.
pub fn normalize(outcome: Result<TcpStream, ProbeFailure>) -> bool {
    outcome.is_ok()
}

async fn resolve(host: &str, port: Port) -> Result<Vec<SocketAddr>, ProbeFailure> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port.as_u16()))
        .await
        .map_err(|e| ProbeFailure::Resolution(e.to_string()))?
        .collect();

    if addrs.is_empty() {
        return Err(ProbeFailure::Resolution(format!("no addresses for {host}")));
    }
    Ok(addrs)
}

/// Try each address in order until one connects.
///
/// All attempts share one deadline. On failure the last error is reported.
pub(crate) async fn connect_any(
    addrs: &[SocketAddr],
    connect_timeout: Duration,
) -> Result<TcpStream, ProbeFailure> {
    let attempts = async {
        let mut last = ProbeFailure::Resolution("no addresses to try".to_string());
        for &addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    trace!(%addr, error = %e, "connect attempt failed");
                    last = classify(&e);
                }
            }
        }
        Err(last)
    };

    timeout(connect_timeout, attempts)
        .await
        .unwrap_or(Err(ProbeFailure::TimedOut))
}

/// Map a connect error onto a failure class.
pub(crate) fn classify(err: &io::Error) -> ProbeFailure {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => ProbeFailure::Refused,
        io::ErrorKind::TimedOut => ProbeFailure::TimedOut,
        _ => {
            let message = err.to_string();
            if message.to_lowercase().contains("unreachable") {
                ProbeFailure::Unreachable(message)
            } else {
                ProbeFailure::Other(message)
            }
        }
    }
}
