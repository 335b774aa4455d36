//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` and `PortList` turn user input into the scan work-list.

use crate::services;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated TCP port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None for port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Validate a wider integer without truncating it.
    pub fn from_u32(value: u32) -> Result<Self, PortError> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(PortError::OutOfRange(value))
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(u32::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range; `start` must not exceed `end`.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Number of ports in the range.
    pub fn len(&self) -> usize {
        usize::from(self.end.0 - self.start.0) + 1
    }

    /// A valid range always holds at least one port.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the range in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A parsed port selection, ready to become a scan work-list.
///
/// Accepted forms:
/// - `common`: the well-known service ports
/// - single port: `80`
/// - comma-separated: `80,443,8080`
/// - range: `1-1024`
/// - mixed: `22,80,8000-8100`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    ports: Vec<Port>,
}

impl PortList {
    /// The well-known ports from the service table, ascending.
    pub fn common() -> Self {
        Self {
            ports: services::common_ports(),
        }
    }

    /// Ports in scan order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn into_vec(self) -> Vec<Port> {
        self.ports
    }
}

impl FromStr for PortList {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }
        if s.eq_ignore_ascii_case("common") {
            return Ok(Self::common());
        }

        let mut ports = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(PortError::InvalidFormat(s.to_string()));
            }

            match part.split_once('-') {
                Some((start, end)) => {
                    let range = PortRange::new(parse_port(start)?, parse_port(end)?)?;
                    ports.extend(range.iter());
                }
                None => ports.push(parse_port(part)?),
            }
        }

        ports.sort_unstable();
        ports.dedup();

        Ok(Self { ports })
    }
}

fn parse_port(raw: &str) -> Result<Port, PortError> {
    let raw = raw.trim();
    let value: u32 = raw
        .parse()
        .map_err(|_| PortError::InvalidFormat(raw.to_string()))?;
    Port::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(list: &PortList) -> Vec<u16> {
        list.ports().iter().map(|p| p.as_u16()).collect()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert_eq!(Port::from_u32(70000), Err(PortError::OutOfRange(70000)));
    }

    #[test]
    fn test_port_range() {
        let range = PortRange::new(Port::new(20).unwrap(), Port::new(25).unwrap()).unwrap();
        assert_eq!(range.len(), 6);
        assert_eq!(range.to_string(), "20-25");
        assert!(PortRange::new(Port::new(25).unwrap(), Port::new(20).unwrap()).is_err());
    }

    #[test]
    fn test_port_list_parsing() {
        let list: PortList = "80".parse().unwrap();
        assert_eq!(nums(&list), vec![80]);

        let list: PortList = "443, 80".parse().unwrap();
        assert_eq!(nums(&list), vec![80, 443]);

        let list: PortList = "22,100-102".parse().unwrap();
        assert_eq!(nums(&list), vec![22, 100, 101, 102]);
    }

    #[test]
    fn test_port_list_dedup() {
        let list: PortList = "80,80,79-81".parse().unwrap();
        assert_eq!(nums(&list), vec![79, 80, 81]);
    }

    #[test]
    fn test_port_list_rejects_out_of_range() {
        assert_eq!(
            "0".parse::<PortList>(),
            Err(PortError::OutOfRange(0))
        );
        assert_eq!(
            "1-65536".parse::<PortList>(),
            Err(PortError::OutOfRange(65536))
        );
    }

    #[test]
    fn test_port_list_rejects_malformed() {
        assert_eq!("".parse::<PortList>(), Err(PortError::Empty));
        assert!(matches!("abc".parse::<PortList>(), Err(PortError::InvalidFormat(_))));
        assert!(matches!("80,,443".parse::<PortList>(), Err(PortError::InvalidFormat(_))));
        assert!(matches!("1-2-3".parse::<PortList>(), Err(PortError::InvalidFormat(_))));
        assert_eq!(
            "100-50".parse::<PortList>(),
            Err(PortError::InvalidRange(100, 50))
        );
    }

    #[test]
    fn test_common_keyword() {
        let list: PortList = "common".parse().unwrap();
        assert_eq!(list, PortList::common());
        assert!(nums(&list).windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_port_serde_rejects_zero() {
        assert!(serde_json::from_str::<Port>("0").is_err());
        assert_eq!(serde_json::from_str::<Port>("22").unwrap().as_u16(), 22);
    }
}
