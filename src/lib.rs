#![forbid(unsafe_code)]
//! smtpping: measure SMTP round-trip latency, phase by phase.

pub mod dns;
pub use dns::{DnsError, DnsRecord, LookupRecords, RecordKind, SystemResolver, lookup};

pub mod select;
pub use select::{AddressFamily, SelectError, parse_server_arg, recipient_domain, select_endpoints};

pub mod probe;
pub use probe::{
    Dialer, Envelope, Phase, PhaseTimings, ProbeFailure, ProbeSession, SessionState, SmtpReply,
    TcpDialer,
};

pub mod stats;
pub use stats::{PhaseStat, PhaseSummary, StatsAccumulator};

pub mod ping;
pub use ping::{CancelToken, PingEvent, PingOptions, PingSummary, Pinger};

pub mod rate;
pub use rate::{RateCounter, fan_out, spawn_reporter};

pub mod message;
