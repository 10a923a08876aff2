use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::dns::RecordKind;

/// Restricts which address records are queried and which socket addresses
/// are dialled.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    #[default]
    Any,
    V4,
    V6,
}

impl AddressFamily {
    pub fn allows(&self, ip: &IpAddr) -> bool {
        match self {
            Self::Any => true,
            Self::V4 => ip.is_ipv4(),
            Self::V6 => ip.is_ipv6(),
        }
    }

    pub fn allows_socket(&self, addr: &SocketAddr) -> bool {
        self.allows(&addr.ip())
    }

    pub(crate) fn record_kinds(&self) -> &'static [RecordKind] {
        match self {
            Self::Any => &[RecordKind::A, RecordKind::Aaaa],
            Self::V4 => &[RecordKind::A],
            Self::V6 => &[RecordKind::Aaaa],
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}
