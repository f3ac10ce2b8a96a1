//! Process model for the simulator.
//!
//! A `ProcessSpec` is the immutable descriptor handed in by the caller; a
//! `Process` is the single live record the engine mutates while the process
//! is in the system.

use std::rc::Rc;

use crate::error::{SimError, SimResult};
use crate::types::TimeMs;

/// The state a live process can be in.
///
/// There is no "new" or "exited" state: a process that has not arrived is
/// simply not referenced by any queue, and a terminated process is dropped
/// from the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    /// Waiting in the ready queue.
    Ready,
    /// Owns the CPU (possibly still switching in).
    Running,
    /// Doing I/O, or switching out of the CPU.
    Blocked,
}

/// Definition of a process for scenario creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Identifier used for display and deterministic tie-breaking.
    pub pid: String,
    /// When the process first enters the system.
    pub arrival_ms: TimeMs,
    /// Length of one CPU burst.
    pub burst_ms: TimeMs,
    /// Number of CPU bursts before the process terminates.
    pub num_bursts: u32,
    /// Blocking time after each non-final burst.
    pub io_ms: TimeMs,
}

impl ProcessSpec {
    pub fn new(
        pid: impl Into<String>,
        arrival_ms: TimeMs,
        burst_ms: TimeMs,
        num_bursts: u32,
        io_ms: TimeMs,
    ) -> Self {
        ProcessSpec {
            pid: pid.into(),
            arrival_ms,
            burst_ms,
            num_bursts,
            io_ms,
        }
    }

    /// Check the field constraints. `line` is only used for error reporting.
    pub fn validate(&self, line: usize) -> SimResult<()> {
        if self.pid.is_empty() {
            return Err(SimError::invalid(line, "empty process id"));
        }
        if self.pid.chars().any(char::is_whitespace) {
            return Err(SimError::invalid(
                line,
                format!("process id {:?} contains whitespace", self.pid),
            ));
        }
        if self.burst_ms == 0 {
            return Err(SimError::invalid(
                line,
                format!("process {}: CPU burst time must be positive", self.pid),
            ));
        }
        if self.num_bursts == 0 {
            return Err(SimError::invalid(
                line,
                format!("process {}: number of bursts must be positive", self.pid),
            ));
        }
        Ok(())
    }
}

/// A live process at runtime.
#[derive(Debug)]
pub struct Process {
    /// Shared with queue entries and pending events for ordering.
    pub pid: Rc<str>,
    pub burst_ms: TimeMs,
    pub io_ms: TimeMs,
    /// Bursts not yet completed.
    pub bursts_remaining: u32,
    /// CPU time left in the current burst. Zero between the end of a burst
    /// and the start of the following I/O.
    pub time_remaining: TimeMs,
    pub state: ProcState,
    /// When the process last entered the ready queue (stats only).
    pub(crate) ready_since: Option<TimeMs>,
    /// When the current burst became ready, for turnaround accounting.
    pub(crate) burst_ready_at: TimeMs,
}

impl Process {
    /// Create the live record for a validated spec.
    pub fn new(spec: &ProcessSpec) -> Self {
        Process {
            pid: Rc::from(spec.pid.as_str()),
            burst_ms: spec.burst_ms,
            io_ms: spec.io_ms,
            bursts_remaining: spec.num_bursts,
            time_remaining: spec.burst_ms,
            state: ProcState::Ready,
            ready_since: None,
            burst_ready_at: spec.arrival_ms,
        }
    }

    /// Whether the current burst has been partially executed already.
    pub fn is_resuming(&self) -> bool {
        self.time_remaining < self.burst_ms
    }

    /// Whether the last CPU burst has completed.
    pub fn is_done(&self) -> bool {
        self.bursts_remaining == 0
    }
}
