use std::io;

use thiserror::Error;

use super::{Phase, SmtpReply};

/// Why a probe session stopped before `QUIT` was answered.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("connect failed: {source}")]
    Connect {
        #[source]
        source: io::Error,
    },
    #[error("send: {phase} failed: {source}")]
    Send {
        phase: Phase,
        #[source]
        source: io::Error,
    },
    #[error("recv: {phase} failed: {source}")]
    Receive {
        phase: Phase,
        #[source]
        source: io::Error,
    },
    #[error("recv: {phase} failed (disconnected)")]
    Disconnected { phase: Phase },
    #[error("recv: {phase} failed ({reply})")]
    Rejected { phase: Phase, reply: SmtpReply },
}

impl ProbeFailure {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Connect { .. } => Phase::Connect,
            Self::Send { phase, .. }
            | Self::Receive { phase, .. }
            | Self::Disconnected { phase }
            | Self::Rejected { phase, .. } => *phase,
        }
    }

    /// The transport never came up, so nothing proves the endpoint reachable.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Rejected { reply, .. } => Some(reply),
            _ => None,
        }
    }
}
