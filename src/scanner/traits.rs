//! Probe trait abstraction and the per-port result type.
//!
//! The worker pool only knows about [`Probe`], which keeps the engine
//! testable without touching the network.

use crate::types::Port;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status of a scanned port as reported to sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortStatus {
    /// A TCP handshake completed.
    Open,
    /// Anything else: refused, timed out, unreachable or unresolvable.
    Closed,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Outcome of probing one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The port that was probed.
    pub port: Port,
    /// Whether the connection was accepted.
    pub is_open: bool,
    /// When the probe finished.
    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// Create a result stamped with the current time.
    pub fn new(port: Port, is_open: bool) -> Self {
        Self {
            port,
            is_open,
            timestamp: Utc::now(),
        }
    }

    pub fn status(&self) -> PortStatus {
        if self.is_open {
            PortStatus::Open
        } else {
            PortStatus::Closed
        }
    }

    /// ISO-8601 timestamp in UTC, second precision.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// A single-port reachability check.
///
/// Implementations must never fail: every failure is reported as `false`.
///
/// # Example
///
/// ```ignore
/// use portsweep::scanner::{Probe, TcpConnectProbe};
///
/// let open = TcpConnectProbe.probe("127.0.0.1", port, timeout).await;
/// ```
#[async_trait]
pub trait Probe: Send + Sync {
    /// Check whether `host:port` accepts a connection within `timeout`.
    async fn probe(&self, host: &str, port: Port, timeout: Duration) -> bool;
}
