use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::probe::{PhaseTimings, ProbeFailure};
use crate::stats::StatsAccumulator;

/// Cloneable stop flag. Once set it stays set for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress notifications handed to the observer of [`Pinger::run`](super::Pinger::run).
#[derive(Debug)]
pub enum PingEvent<'a> {
    /// About to probe `endpoint`, printed once per endpoint.
    Target {
        endpoint: &'a str,
        addr: SocketAddr,
        port: u16,
        data_size: usize,
    },
    Reply {
        seq: u32,
        endpoint: &'a str,
        timings: &'a PhaseTimings,
    },
    Failed {
        seq: u32,
        endpoint: &'a str,
        failure: &'a ProbeFailure,
    },
    /// No socket address of the allowed family for `endpoint`.
    Unresolvable { endpoint: &'a str },
}

/// Outcome of one run.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingSummary {
    /// Endpoint that accepted the first connection, if any did.
    pub pinned: Option<String>,
    /// Sequences consumed, failed ones included.
    pub transmitted: u32,
    pub stats: StatsAccumulator,
    pub cancelled: bool,
}

impl PingSummary {
    pub fn sent_any(&self) -> bool {
        self.pinned.is_some() && self.transmitted > 0
    }
}
