//! Per-run scheduling statistics.
//!
//! The engine feeds a `RunStats` as it processes events; nothing here
//! influences scheduling. The report format is one block per algorithm:
//!
//! ```text
//! Algorithm FCFS
//! -- average CPU burst time: 84.25 ms
//! -- average wait time: 10.50 ms
//! -- average turnaround time: 98.75 ms
//! -- total number of context switches: 12
//! -- total number of preemptions: 0
//! ```

use std::io::{self, Write};

use serde::Serialize;

use crate::types::{Algorithm, TimeMs};

/// Summary statistics for a distribution of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionStats {
    /// Number of samples.
    pub count: usize,
    /// Minimum value (or 0 if empty).
    pub min: TimeMs,
    /// Maximum value (or 0 if empty).
    pub max: TimeMs,
    /// Sum of all values.
    pub sum: TimeMs,
}

impl DistributionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample value.
    pub fn add(&mut self, value: TimeMs) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Mean value (or 0 if empty).
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

/// Statistics gathered while simulating one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub algorithm: Algorithm,
    /// CPU burst lengths, one sample per burst executed.
    pub burst: DistributionStats,
    /// Ready-queue waits, one sample per dispatch from the queue.
    pub wait: DistributionStats,
    /// Per-burst turnaround: ready for the burst until its switch-out ends.
    pub turnaround: DistributionStats,
    /// Number of processes switched onto the CPU.
    pub context_switches: usize,
    /// Number of times the CPU was taken from an unfinished burst.
    pub preemptions: usize,
    /// Simulated time at which the run ended.
    pub end_time_ms: TimeMs,
}

impl RunStats {
    pub(crate) fn new(algorithm: Algorithm) -> Self {
        RunStats {
            algorithm,
            burst: DistributionStats::new(),
            wait: DistributionStats::new(),
            turnaround: DistributionStats::new(),
            context_switches: 0,
            preemptions: 0,
            end_time_ms: 0,
        }
    }

    /// Total number of CPU bursts executed.
    pub fn total_bursts(&self) -> usize {
        self.burst.count
    }

    pub fn avg_burst_ms(&self) -> f64 {
        self.burst.mean()
    }

    /// Total ready-queue wait divided by the number of bursts.
    ///
    /// A burst that is preempted waits more than once, so this is not the
    /// mean of `wait`.
    pub fn avg_wait_ms(&self) -> f64 {
        per_burst(self.wait.sum, self.total_bursts())
    }

    pub fn avg_turnaround_ms(&self) -> f64 {
        self.turnaround.mean()
    }

    /// The summary record written to stats files.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            algorithm: self.algorithm,
            avg_burst_ms: round2(self.avg_burst_ms()),
            avg_wait_ms: round2(self.avg_wait_ms()),
            avg_turnaround_ms: round2(self.avg_turnaround_ms()),
            context_switches: self.context_switches,
            preemptions: self.preemptions,
        }
    }
}

fn per_burst(total: TimeMs, bursts: usize) -> f64 {
    if bursts == 0 {
        0.0
    } else {
        total as f64 / bursts as f64
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Averages and counters reported per algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub algorithm: Algorithm,
    pub avg_burst_ms: f64,
    pub avg_wait_ms: f64,
    pub avg_turnaround_ms: f64,
    pub context_switches: usize,
    pub preemptions: usize,
}

/// Write the text report for a sequence of runs.
pub fn write_report<W: Write>(out: &mut W, runs: &[RunStats]) -> io::Result<()> {
    for run in runs {
        let s = run.summary();
        writeln!(out, "Algorithm {}", s.algorithm)?;
        writeln!(out, "-- average CPU burst time: {:.2} ms", s.avg_burst_ms)?;
        writeln!(out, "-- average wait time: {:.2} ms", s.avg_wait_ms)?;
        writeln!(out, "-- average turnaround time: {:.2} ms", s.avg_turnaround_ms)?;
        writeln!(out, "-- total number of context switches: {}", s.context_switches)?;
        writeln!(out, "-- total number of preemptions: {}", s.preemptions)?;
    }
    Ok(())
}

/// Write the report as a JSON array of summaries.
pub fn write_report_json<W: Write>(out: &mut W, runs: &[RunStats]) -> io::Result<()> {
    let summaries: Vec<StatsSummary> = runs.iter().map(RunStats::summary).collect();
    serde_json::to_writer_pretty(&mut *out, &summaries)?;
    writeln!(out)
}
