//! SMTP probe session (connect, banner, HELO, MAIL FROM, RCPT TO, DATA,
//! message transfer, QUIT) with one timestamp per completed phase.

mod dialer;
mod error;
mod session;
mod stream;
mod types;

pub use dialer::{Dialer, TcpDialer};
pub use error::ProbeFailure;
pub use session::ProbeSession;
pub use types::{Envelope, Phase, PhaseTimings, SessionState, SmtpReply};
