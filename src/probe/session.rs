use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::Instant;

use super::stream::SmtpStream;
use super::{Dialer, Envelope, Phase, PhaseTimings, ProbeFailure, SessionState, SmtpReply};

/// One SMTP ping: connect, then banner through `QUIT`, strictly in order.
///
/// The session never retries. Any failure drops the transport (closing the
/// socket) and leaves the session in [`SessionState::Failed`].
pub struct ProbeSession<'e> {
    envelope: &'e Envelope,
    state: SessionState,
}

impl<'e> ProbeSession<'e> {
    pub fn new(envelope: &'e Envelope) -> Self {
        Self {
            envelope,
            state: SessionState::Init,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn run<D>(&mut self, dialer: &mut D, addr: &SocketAddr) -> Result<PhaseTimings, ProbeFailure>
    where
        D: Dialer + ?Sized,
    {
        self.state = SessionState::Init;
        let init = Instant::now();
        let transport = match dialer.dial(addr) {
            Ok(transport) => transport,
            Err(source) => return Err(self.fail(ProbeFailure::Connect { source })),
        };

        let mut stamps = [Instant::now(); Phase::COUNT];
        self.state = SessionState::Connected;

        let mut stream = SmtpStream::new(transport);
        for phase in Phase::SESSION {
            if let Err(failure) = self.step(&mut stream, phase) {
                drop(stream);
                return Err(self.fail(failure));
            }
            stamps[phase.index()] = Instant::now();
            self.state = SessionState::after(phase);
        }

        drop(stream);
        self.state = SessionState::Closed;
        Ok(PhaseTimings::new(init, stamps))
    }

    fn step<S>(&self, stream: &mut SmtpStream<S>, phase: Phase) -> Result<SmtpReply, ProbeFailure>
    where
        S: Read + Write,
    {
        let sent = match phase {
            Phase::DataSent => stream
                .send(&self.envelope.payload)
                .and_then(|()| stream.send(self.envelope.end_of_data())),
            _ => match self.envelope.command(phase) {
                Some(command) => stream.send(command.as_bytes()),
                None => Ok(()),
            },
        };
        sent.map_err(|source| ProbeFailure::Send { phase, source })?;

        let reply = stream
            .read_reply()
            .map_err(|source| ProbeFailure::Receive { phase, source })?
            .ok_or(ProbeFailure::Disconnected { phase })?;

        match phase.accepted_class() {
            Some(class) if reply.class() != Some(class) => {
                Err(ProbeFailure::Rejected { phase, reply })
            }
            _ => Ok(reply),
        }
    }

    fn fail(&mut self, failure: ProbeFailure) -> ProbeFailure {
        self.state = SessionState::Failed(failure.phase());
        failure
    }
}
