//! Running per-phase latency statistics across successful probe sessions.

use crate::probe::{Phase, PhaseTimings};

/// `{min, max, sum, count}` for one phase, in milliseconds.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseStat {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
}

impl PhaseStat {
    /// Min and max are seeded from the first sample, never from zero.
    pub fn record(&mut self, delta_ms: f64) {
        if self.count == 0 || delta_ms < self.min {
            self.min = delta_ms;
        }
        if self.count == 0 || delta_ms > self.max {
            self.max = delta_ms;
        }
        self.sum += delta_ms;
        self.count += 1;
    }

    pub fn avg(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// One line of the end-of-run report.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

/// Statistics owned by a single pinger; never shared between workers.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    phases: [PhaseStat; Phase::COUNT],
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, phase: Phase, delta_ms: f64) {
        self.phases[phase.index()].record(delta_ms);
    }

    /// Folds every phase of a completed session.
    pub fn record_timings(&mut self, timings: &PhaseTimings) {
        for (phase, millis) in timings.iter_millis() {
            self.record(phase, millis);
        }
    }

    pub fn get(&self, phase: Phase) -> &PhaseStat {
        &self.phases[phase.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(|stat| stat.count == 0)
    }

    pub fn report(&self) -> Vec<PhaseSummary> {
        Phase::ALL
            .into_iter()
            .map(|phase| {
                let stat = self.get(phase);
                PhaseSummary {
                    phase,
                    min: stat.min,
                    avg: stat.avg(),
                    max: stat.max,
                }
            })
            .collect()
    }
}
