use std::time::Duration;

use crate::select::AddressFamily;

/// Knobs for the reconnect loop driven by [`Pinger`](super::Pinger).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingOptions {
    pub port: u16,
    /// Number of sequences to run; `0` keeps going until cancelled.
    pub count: u32,
    /// Pause between two sessions against the pinned endpoint.
    pub wait: Duration,
    pub family: AddressFamily,
}

impl Default for PingOptions {
    fn default() -> Self {
        Self {
            port: 25,
            count: 0,
            wait: Duration::from_millis(1000),
            family: AddressFamily::Any,
        }
    }
}

impl PingOptions {
    pub(crate) fn limit_reached(&self, sequence: u32) -> bool {
        self.count > 0 && sequence >= self.count
    }
}
