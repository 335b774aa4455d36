//! Core type definitions using newtype patterns for type safety.
//!
//! Invalid ports and empty targets are rejected at construction, so the scan
//! engine never has to re-check them.

mod port;
mod target;

pub use port::{Port, PortError, PortList, PortRange};
pub use target::{ScanTarget, TargetError};
