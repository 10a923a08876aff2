//! The reconnect loop: walk the endpoint list, pin the first endpoint that
//! accepts a connection and keep probing it until the count is reached or
//! the run is cancelled.

mod options;
mod types;

pub use options::PingOptions;
pub use types::{CancelToken, PingEvent, PingSummary};

use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::probe::{Dialer, Envelope, ProbeSession};
use crate::rate::RateCounter;
use crate::select::AddressFamily;
use crate::stats::StatsAccumulator;

enum Flow {
    /// First connect failed; try the next endpoint.
    NextEndpoint,
    Stop,
}

/// Drives [`ProbeSession`]s against an endpoint list.
pub struct Pinger<'e, D> {
    envelope: &'e Envelope,
    dialer: D,
    options: PingOptions,
    cancel: CancelToken,
    counter: Option<RateCounter>,
    pause: Box<dyn FnMut(Duration) + 'e>,
}

impl<'e, D: Dialer> Pinger<'e, D> {
    pub fn new(envelope: &'e Envelope, dialer: D, options: PingOptions) -> Self {
        Self {
            envelope,
            dialer,
            options,
            cancel: CancelToken::new(),
            counter: None,
            pause: Box::new(thread::sleep),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Bump `counter` once per completed delivery.
    pub fn with_rate_counter(mut self, counter: RateCounter) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Replace the inter-probe sleep.
    pub fn with_pause(mut self, pause: impl FnMut(Duration) + 'e) -> Self {
        self.pause = Box::new(pause);
        self
    }

    pub fn dialer(&self) -> &D {
        &self.dialer
    }

    pub fn run<O>(&mut self, endpoints: &[String], mut observer: O) -> PingSummary
    where
        O: FnMut(PingEvent<'_>),
    {
        let mut sequence = 0;
        let mut stats = StatsAccumulator::new();
        let mut pinned = None;

        for endpoint in endpoints {
            if self.stopped(sequence) {
                break;
            }
            let Some(addr) = socket_addr(endpoint, self.options.port, self.options.family) else {
                warn!(%endpoint, family = %self.options.family, "no usable socket address");
                observer(PingEvent::Unresolvable { endpoint });
                continue;
            };

            observer(PingEvent::Target {
                endpoint,
                addr,
                port: self.options.port,
                data_size: self.envelope.data_size(),
            });
            match self.probe_endpoint(endpoint, addr, &mut sequence, &mut stats, &mut observer) {
                Flow::NextEndpoint => continue,
                Flow::Stop => {
                    if sequence > 0 {
                        pinned = Some(endpoint.clone());
                    }
                    break;
                }
            }
        }

        PingSummary {
            pinned,
            transmitted: sequence,
            stats,
            cancelled: self.cancel.is_cancelled(),
        }
    }

    fn probe_endpoint<O>(
        &mut self,
        endpoint: &str,
        addr: SocketAddr,
        sequence: &mut u32,
        stats: &mut StatsAccumulator,
        observer: &mut O,
    ) -> Flow
    where
        O: FnMut(PingEvent<'_>),
    {
        loop {
            if self.stopped(*sequence) {
                return Flow::Stop;
            }
            if *sequence > 0 {
                (self.pause)(self.options.wait);
                *sequence += 1;
            }

            let mut session = ProbeSession::new(self.envelope);
            match session.run(&mut self.dialer, &addr) {
                Ok(timings) => {
                    pin(endpoint, sequence);
                    stats.record_timings(&timings);
                    if let Some(counter) = &self.counter {
                        counter.increment();
                    }
                    debug!(seq = *sequence, %endpoint, "delivered");
                    observer(PingEvent::Reply {
                        seq: *sequence,
                        endpoint,
                        timings: &timings,
                    });
                }
                Err(failure) if failure.is_connect_failure() => {
                    warn!(seq = *sequence, %endpoint, error = %failure, "connect failed");
                    observer(PingEvent::Failed {
                        seq: *sequence,
                        endpoint,
                        failure: &failure,
                    });
                    if *sequence == 0 {
                        return Flow::NextEndpoint;
                    }
                }
                Err(failure) => {
                    pin(endpoint, sequence);
                    warn!(
                        seq = *sequence,
                        %endpoint,
                        phase = %failure.phase(),
                        error = %failure,
                        "probe failed"
                    );
                    observer(PingEvent::Failed {
                        seq: *sequence,
                        endpoint,
                        failure: &failure,
                    });
                }
            }
        }
    }

    fn stopped(&self, sequence: u32) -> bool {
        self.cancel.is_cancelled() || self.options.limit_reached(sequence)
    }
}

/// The first established connection starts the sequence at 1.
fn pin(endpoint: &str, sequence: &mut u32) {
    if *sequence == 0 {
        *sequence = 1;
        info!(%endpoint, "endpoint pinned");
    }
}

fn socket_addr(endpoint: &str, port: u16, family: AddressFamily) -> Option<SocketAddr> {
    let host = endpoint.trim_start_matches('[').trim_end_matches(']');
    match (host, port).to_socket_addrs() {
        Ok(mut addrs) => addrs.find(|addr| family.allows_socket(addr)),
        Err(err) => {
            debug!(%endpoint, error = %err, "socket address lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests;
