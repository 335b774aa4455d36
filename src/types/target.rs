//! Scan target type.
//!
//! A target is kept as the user typed it: an IP literal or a hostname.
//! Name resolution happens per probe, so a host that does not resolve
//! simply reports every port closed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The single host a scan runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    host: String,
}

impl ScanTarget {
    /// Validate and wrap a host string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        // Bracketed IPv6 as typed in URLs
        let bare = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        if bare.parse::<IpAddr>().is_ok() || is_valid_hostname(bare) {
            Ok(Self {
                host: bare.to_string(),
            })
        } else {
            Err(TargetError::InvalidFormat(s.to_string()))
        }
    }

    /// Host as given, without brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The literal IP address, if the target is not a hostname.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)
    }
}

impl FromStr for ScanTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target host must not be empty")]
    Empty,
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
}

/// Check if a string is a plausible hostname.
///
/// Underscores are allowed; resolution decides the rest.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Fully-qualified names may end in a dot
    let s = s.strip_suffix('.').unwrap_or(s);

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}
