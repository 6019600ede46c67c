use std::time::Duration;

use super::Phase;

/// Timing and row count of one completed phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseMetrics {
    pub phase: Phase,
    pub elapsed_ms: u64,
    /// Rows written or deleted by the phase.
    pub rows: u64,
}

/// Performance metrics from a generation run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Completed phases in execution order.
    pub phases: Vec<PhaseMetrics>,
    /// Users regenerated after a uniqueness conflict.
    pub user_retries: u64,
    /// Review comments created alongside reviews.
    pub review_comments: u64,
    /// Logos saved through the logo store.
    pub logos: u64,
}

impl RunMetrics {
    pub fn record(&mut self, phase: Phase, elapsed: Duration, rows: u64) {
        self.phases.push(PhaseMetrics {
            phase,
            elapsed_ms: elapsed.as_millis() as u64,
            rows,
        });
    }

    /// Rows of the most recent run of `phase`.
    pub fn rows(&self, phase: Phase) -> Option<u64> {
        self.phases
            .iter()
            .rev()
            .find(|m| m.phase == phase)
            .map(|m| m.rows)
    }

    pub fn total_time_ms(&self) -> u64 {
        self.phases.iter().map(|m| m.elapsed_ms).sum()
    }
}
