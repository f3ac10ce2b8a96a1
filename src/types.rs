//! Newtype wrappers and type aliases for domain concepts.
//!
//! The process handle is a newtype so it cannot be confused with plain
//! counters. Timestamps and durations are a bare alias: the engine does a
//! lot of arithmetic on them and never mixes units.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Simulated time (and durations) in milliseconds.
pub type TimeMs = u64;

/// Handle into the engine's process table.
///
/// Assigned in input order. Ordering decisions never use it; they use the
/// process's textual `pid` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProcId(pub usize);

/// Scheduling policy under simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Algorithm {
    /// First-come-first-served, non-preemptive.
    #[serde(rename = "FCFS")]
    Fcfs,
    /// Preemptive shortest remaining time.
    #[serde(rename = "SRT")]
    Srt,
    /// Round robin with a fixed time slice.
    #[serde(rename = "RR")]
    Rr,
}

impl Algorithm {
    /// All algorithms, in the order a full run executes them.
    pub const ALL: [Algorithm; 3] = [Algorithm::Fcfs, Algorithm::Srt, Algorithm::Rr];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Fcfs => "FCFS",
            Algorithm::Srt => "SRT",
            Algorithm::Rr => "RR",
        }
    }

    /// Whether the ready queue is ordered by remaining burst time.
    pub fn orders_by_remaining(self) -> bool {
        self == Algorithm::Srt
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Algorithm::Fcfs),
            "srt" => Ok(Algorithm::Srt),
            "rr" => Ok(Algorithm::Rr),
            other => Err(format!(
                "unknown algorithm {other:?}; expected one of fcfs, srt, rr"
            )),
        }
    }
}
