//! Multi-worker fan-out and the shared delivered-per-interval counter.
//!
//! Workers are fully isolated: each one resolves, selects and probes on its
//! own and keeps its own statistics. The [`RateCounter`] is the only state
//! they share.

use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::ping::CancelToken;

/// Deliveries completed since the last [`take`](RateCounter::take).
#[derive(Debug, Clone, Default)]
pub struct RateCounter {
    delivered: Arc<Mutex<u64>>,
}

impl RateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        *self.delivered.lock() += 1;
    }

    /// Read and zero the counter.
    pub fn take(&self) -> u64 {
        std::mem::take(&mut *self.delivered.lock())
    }
}

/// Every `interval`, hand the deliveries counted since the previous tick to
/// `sink`. Returns once `stop` is set.
pub fn spawn_reporter<F>(
    counter: RateCounter,
    stop: CancelToken,
    interval: Duration,
    mut sink: F,
) -> JoinHandle<()>
where
    F: FnMut(u64) + Send + 'static,
{
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if stop.is_cancelled() {
                break;
            }
            sink(counter.take());
        }
        debug!("rate reporter stopped");
    })
}

/// Run `job` on `workers` threads, passing each its worker index, and
/// collect the results in index order. A panicking worker re-raises its
/// panic here once every worker has finished.
pub fn fan_out<T, F>(workers: usize, job: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let job = &job;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|index| scope.spawn(move || job(index)))
            .collect();
        let results: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        results
            .into_iter()
            .map(|result| result.unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::mpsc;

    #[test]
    fn take_reads_and_zeroes() {
        let counter = RateCounter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.take(), 2);
        assert_eq!(counter.take(), 0);
    }

    #[test]
    fn counter_is_shared_between_clones() {
        let counter = RateCounter::new();
        let workers = fan_out(4, |_| {
            let counter = counter.clone();
            for _ in 0..250 {
                counter.increment();
            }
        });
        assert_eq!(workers.len(), 4);
        assert_eq!(counter.take(), 1000);
    }

    #[test]
    fn fan_out_runs_each_worker_once() {
        let results = fan_out(8, |index| (index, thread::current().id()));
        let indices: Vec<_> = results.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());

        let threads: HashSet<_> = results.iter().map(|(_, id)| *id).collect();
        assert_eq!(threads.len(), 8);
    }

    #[test]
    fn workers_keep_their_own_state() {
        let results = fan_out(3, |index| {
            let mut own = Vec::new();
            for step in 0..=index {
                own.push(step);
            }
            own
        });
        assert_eq!(results, vec![vec![0], vec![0, 1], vec![0, 1, 2]]);
    }

    #[test]
    fn reporter_delivers_until_stopped() {
        let counter = RateCounter::new();
        let stop = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        counter.increment();
        counter.increment();
        counter.increment();
        let handle = spawn_reporter(
            counter.clone(),
            stop.clone(),
            Duration::from_millis(10),
            move |delivered| {
                let _ = tx.send(delivered);
            },
        );

        let first = rx.recv_timeout(Duration::from_secs(5)).expect("first tick");
        assert_eq!(first, 3);
        stop.cancel();
        handle.join().expect("reporter thread");
        assert_eq!(counter.take(), 0);
    }
}
