use std::fmt;
use std::time::{Duration, Instant};

/// A timed step of one SMTP ping.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Connect,
    Banner,
    Helo,
    MailFrom,
    RcptTo,
    Data,
    DataSent,
    Quit,
}

impl Phase {
    pub const COUNT: usize = 8;

    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Connect,
        Phase::Banner,
        Phase::Helo,
        Phase::MailFrom,
        Phase::RcptTo,
        Phase::Data,
        Phase::DataSent,
        Phase::Quit,
    ];

    /// Phases driven over an established connection, in protocol order.
    pub const SESSION: [Phase; 7] = [
        Phase::Banner,
        Phase::Helo,
        Phase::MailFrom,
        Phase::RcptTo,
        Phase::Data,
        Phase::DataSent,
        Phase::Quit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Banner => "banner",
            Self::Helo => "helo",
            Self::MailFrom => "mailfrom",
            Self::RcptTo => "rcptto",
            Self::Data => "data",
            Self::DataSent => "datasent",
            Self::Quit => "quit",
        }
    }

    /// Reply class accepted for this phase; `None` accepts any reply.
    pub fn accepted_class(self) -> Option<u8> {
        match self {
            Self::Banner | Self::Helo | Self::MailFrom | Self::RcptTo => Some(b'2'),
            Self::Data => Some(b'3'),
            Self::Connect | Self::DataSent | Self::Quit => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a [`ProbeSession`](super::ProbeSession) stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Connected,
    Banner,
    Helo,
    MailFrom,
    RcptTo,
    Data,
    DataSent,
    Quit,
    Closed,
    Failed(Phase),
}

impl SessionState {
    pub(crate) fn after(phase: Phase) -> Self {
        match phase {
            Phase::Connect => Self::Connected,
            Phase::Banner => Self::Banner,
            Phase::Helo => Self::Helo,
            Phase::MailFrom => Self::MailFrom,
            Phase::RcptTo => Self::RcptTo,
            Phase::Data => Self::Data,
            Phase::DataSent => Self::DataSent,
            Phase::Quit => Self::Quit,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed(_))
    }
}

/// A final SMTP reply line with its three-character status.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub status: String,
    pub message: String,
}

impl SmtpReply {
    pub(crate) fn from_line(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let status = line.chars().take(3).collect();
        let message = line.get(4..).unwrap_or_default().to_string();
        Self { status, message }
    }

    pub fn code(&self) -> Option<u16> {
        self.status.parse().ok()
    }

    pub fn class(&self) -> Option<u8> {
        self.status
            .as_bytes()
            .first()
            .copied()
            .filter(u8::is_ascii_digit)
    }

    pub fn is_positive_completion(&self) -> bool {
        self.class() == Some(b'2')
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.status)
        } else {
            write!(f, "{} {}", self.status, self.message)
        }
    }
}

/// What one probe sends: HELO name, envelope and message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub helo: String,
    pub sender: String,
    pub recipient: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(
        helo: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            helo: helo.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            payload,
        }
    }

    /// Bytes put on the wire during the DATA transfer, terminator included.
    pub fn data_size(&self) -> usize {
        self.payload.len() + self.end_of_data().len()
    }

    pub(crate) fn end_of_data(&self) -> &'static [u8] {
        if self.payload.is_empty() || self.payload.ends_with(b"\r\n") {
            b".\r\n"
        } else {
            b"\r\n.\r\n"
        }
    }

    pub(crate) fn command(&self, phase: Phase) -> Option<String> {
        match phase {
            Phase::Helo => Some(format!("HELO {}\r\n", self.helo)),
            Phase::MailFrom => Some(format!("MAIL FROM: <{}>\r\n", self.sender)),
            Phase::RcptTo => Some(format!("RCPT TO: <{}>\r\n", self.recipient)),
            Phase::Data => Some("DATA\r\n".to_string()),
            Phase::Quit => Some("QUIT\r\n".to_string()),
            Phase::Connect | Phase::Banner | Phase::DataSent => None,
        }
    }
}

/// Instants recorded by one successful session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimings {
    init: Instant,
    stamps: [Instant; Phase::COUNT],
}

impl PhaseTimings {
    pub(crate) fn new(init: Instant, stamps: [Instant; Phase::COUNT]) -> Self {
        Self { init, stamps }
    }

    /// `connect` is measured from the pre-connect instant, every other phase
    /// from the moment the connection was established.
    pub fn elapsed(&self, phase: Phase) -> Duration {
        let origin = match phase {
            Phase::Connect => self.init,
            _ => self.stamps[Phase::Connect.index()],
        };
        self.stamps[phase.index()].saturating_duration_since(origin)
    }

    pub fn millis(&self, phase: Phase) -> f64 {
        self.elapsed(phase).as_secs_f64() * 1000.0
    }

    pub fn iter_millis(&self) -> impl Iterator<Item = (Phase, f64)> + '_ {
        Phase::ALL.into_iter().map(|phase| (phase, self.millis(phase)))
    }
}
