use std::fmt;

use trust_dns_resolver::proto::rr::{RData, RecordType};

use super::resolver::normalize_exchange;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Mx,
    A,
    Aaaa,
}

impl RecordKind {
    pub fn record_type(self) -> RecordType {
        match self {
            Self::Mx => RecordType::MX,
            Self::A => RecordType::A,
            Self::Aaaa => RecordType::AAAA,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mx => f.write_str("MX"),
            Self::A => f.write_str("A"),
            Self::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// One answer record reduced to what endpoint selection needs.
///
/// `preference` is only meaningful for MX records; address records carry 0.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub kind: RecordKind,
    pub preference: u16,
    pub value: String,
}

impl DnsRecord {
    pub fn new(kind: RecordKind, preference: u16, value: impl Into<String>) -> Self {
        Self {
            kind,
            preference,
            value: value.into(),
        }
    }

    pub fn address(kind: RecordKind, value: impl Into<String>) -> Self {
        Self::new(kind, 0, value)
    }

    pub(crate) fn from_rdata(rdata: &RData) -> Option<Self> {
        match rdata {
            RData::MX(mx) => Some(Self::new(
                RecordKind::Mx,
                mx.preference(),
                normalize_exchange(mx.exchange().to_utf8()),
            )),
            RData::A(a) => Some(Self::address(RecordKind::A, a.0.to_string())),
            RData::AAAA(aaaa) => Some(Self::address(RecordKind::Aaaa, aaaa.0.to_string())),
            _ => None,
        }
    }
}
