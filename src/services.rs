//! Service names for well-known ports.
//!
//! The same table doubles as the `common` port preset.

use crate::types::Port;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Well-known TCP services, ascending by port.
pub const COMMON_SERVICES: &[(u16, &str)] = &[
    (20, "FTP-data"),
    (21, "FTP-control"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP"),
    (69, "TFTP"),
    (80, "HTTP"),
    (110, "POP3"),
    (123, "NTP"),
    (139, "NetBIOS"),
    (143, "IMAP"),
    (161, "SNMP"),
    (194, "IRC"),
    (443, "HTTPS"),
    (445, "SMB"),
    (587, "SMTP (submission)"),
    (631, "IPP"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1433, "MSSQL"),
    (1521, "Oracle"),
    (2049, "NFS"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8080, "HTTP-alt"),
];

static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> =
    LazyLock::new(|| COMMON_SERVICES.iter().copied().collect());

/// Look up the service name for a port.
pub fn service_name(port: Port) -> Option<&'static str> {
    PORT_SERVICES.get(&port.as_u16()).copied()
}

/// Every port in the table, ascending.
pub fn common_ports() -> Vec<Port> {
    COMMON_SERVICES
        .iter()
        .filter_map(|&(port, _)| Port::new(port))
        .collect()
}
