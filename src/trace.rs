//! Trace event recording for the simulator.
//!
//! Every observable transition (arrival, dispatch, burst completion, I/O,
//! preemption, termination) is recorded as a `TraceEvent` carrying the
//! simulated time and a snapshot of the ready queue taken after the
//! transition. `Display` renders the canonical line:
//!
//! ```text
//! time 172ms: Process A completed a CPU burst; 4 bursts to go [Q B C]
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::types::{Algorithm, TimeMs};

/// The type of transition recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    /// The simulation began.
    SimStarted,
    /// A process arrived and joined the ready queue.
    Arrived { pid: String },
    /// A process arrived and took the CPU from `running`.
    ArrivedPreempting { pid: String, running: String },
    /// A process started executing. `remaining` is set when it resumes a
    /// partially executed burst.
    Started {
        pid: String,
        remaining: Option<TimeMs>,
    },
    /// A non-final CPU burst completed.
    BurstCompleted { pid: String, bursts_left: u32 },
    /// The final CPU burst completed.
    Terminated { pid: String },
    /// Switch-out completed; the process now blocks on I/O until `until`.
    SwitchedOutToIo { pid: String, until: TimeMs },
    /// Switch-out completed with the burst unfinished; back in the ready queue.
    SwitchedOutToReady { pid: String },
    /// Switch-out of a terminated process completed.
    SwitchedOutRemoved { pid: String },
    /// I/O completed and the process joined the ready queue.
    IoCompleted { pid: String },
    /// I/O completed and the process took the CPU from `running`.
    IoCompletedPreempting { pid: String, running: String },
    /// The time slice expired and the process gave up the CPU.
    SlicePreempted { pid: String, remaining: TimeMs },
    /// The time slice expired but nothing was waiting.
    SliceExpiredNoPreemption { pid: String },
    /// The simulation finished.
    SimEnded,
}

impl TraceKind {
    /// The process the transition is about, if any.
    pub fn pid(&self) -> Option<&str> {
        match self {
            TraceKind::SimStarted | TraceKind::SimEnded => None,
            TraceKind::Arrived { pid }
            | TraceKind::ArrivedPreempting { pid, .. }
            | TraceKind::Started { pid, .. }
            | TraceKind::BurstCompleted { pid, .. }
            | TraceKind::Terminated { pid }
            | TraceKind::SwitchedOutToIo { pid, .. }
            | TraceKind::SwitchedOutToReady { pid }
            | TraceKind::SwitchedOutRemoved { pid }
            | TraceKind::IoCompleted { pid }
            | TraceKind::IoCompletedPreempting { pid, .. }
            | TraceKind::SlicePreempted { pid, .. }
            | TraceKind::SliceExpiredNoPreemption { pid } => Some(pid),
        }
    }

    /// Whether this transition takes the CPU away from a process before its
    /// burst completes.
    pub fn is_preemption(&self) -> bool {
        matches!(
            self,
            TraceKind::ArrivedPreempting { .. }
                | TraceKind::IoCompletedPreempting { .. }
                | TraceKind::SlicePreempted { .. }
        )
    }
}

/// A single trace line produced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Simulated time when the transition happened.
    pub time_ms: TimeMs,
    pub kind: TraceKind,
    /// Ready-queue pids in dispatch order, or `<empty>`.
    pub queue: String,
    /// Algorithm name, used by the boundary lines.
    algorithm: Algorithm,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time {}ms: ", self.time_ms)?;
        match &self.kind {
            TraceKind::SimStarted => write!(f, "Simulator started for {}", self.algorithm)?,
            TraceKind::Arrived { pid } => {
                write!(f, "Process {pid} arrived and added to ready queue")?
            }
            TraceKind::ArrivedPreempting { pid, running } => {
                write!(f, "Process {pid} arrived and will preempt {running}")?
            }
            TraceKind::Started {
                pid,
                remaining: None,
            } => write!(f, "Process {pid} started using the CPU")?,
            TraceKind::Started {
                pid,
                remaining: Some(ms),
            } => write!(f, "Process {pid} started using the CPU with {ms}ms remaining")?,
            TraceKind::BurstCompleted { pid, bursts_left } => write!(
                f,
                "Process {pid} completed a CPU burst; {bursts_left} {} to go",
                if *bursts_left == 1 { "burst" } else { "bursts" }
            )?,
            TraceKind::Terminated { pid } => write!(f, "Process {pid} terminated")?,
            TraceKind::SwitchedOutToIo { pid, until } => write!(
                f,
                "Process {pid} switched out of CPU; will block on I/O until time {until}ms"
            )?,
            TraceKind::SwitchedOutToReady { pid } => {
                write!(f, "Process {pid} switched out of CPU; added to ready queue")?
            }
            TraceKind::SwitchedOutRemoved { pid } => {
                write!(f, "Process {pid} switched out of CPU; removed from system")?
            }
            TraceKind::IoCompleted { pid } => {
                write!(f, "Process {pid} completed I/O; added to ready queue")?
            }
            TraceKind::IoCompletedPreempting { pid, running } => {
                write!(f, "Process {pid} completed I/O and will preempt {running}")?
            }
            TraceKind::SlicePreempted { pid, remaining } => write!(
                f,
                "Time slice expired; process {pid} preempted with {remaining}ms to go"
            )?,
            TraceKind::SliceExpiredNoPreemption { .. } => write!(
                f,
                "Time slice expired; no preemption because ready queue is empty"
            )?,
            TraceKind::SimEnded => write!(f, "Simulator ended for {}", self.algorithm)?,
        }
        write!(f, " [Q {}]", self.queue)
    }
}

/// A complete simulation trace, in the order transitions happened.
#[derive(Debug, Clone)]
pub struct Trace {
    algorithm: Algorithm,
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            events: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, time_ms: TimeMs, kind: TraceKind, queue: String) {
        self.events.push(TraceEvent {
            time_ms,
            kind,
            queue,
            algorithm: self.algorithm,
        });
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Get all events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Rendered trace lines.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }

    /// Time of the final event (the end of the simulation).
    pub fn end_time(&self) -> TimeMs {
        self.events.last().map_or(0, |e| e.time_ms)
    }

    /// Events concerning `pid`.
    pub fn events_for<'a>(&'a self, pid: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events
            .iter()
            .filter(move |e| e.kind.pid() == Some(pid))
    }

    /// Number of times a process started using the CPU.
    pub fn dispatch_count(&self, pid: &str) -> usize {
        self.events_for(pid)
            .filter(|e| matches!(e.kind, TraceKind::Started { .. }))
            .count()
    }

    /// Number of preemptions across all processes.
    pub fn preemption_count(&self) -> usize {
        self.events.iter().filter(|e| e.kind.is_preemption()).count()
    }

    /// Time at which `pid` terminated, if it did.
    pub fn termination_time(&self, pid: &str) -> Option<TimeMs> {
        self.events_for(pid)
            .find(|e| matches!(e.kind, TraceKind::Terminated { .. }))
            .map(|e| e.time_ms)
    }

    /// Total CPU time consumed by `pid`.
    ///
    /// Sums the intervals between each `Started` and the next transition
    /// that ends execution (burst completion, termination, slice preemption,
    /// or being preempted by another process).
    pub fn cpu_time(&self, pid: &str) -> TimeMs {
        let mut total: TimeMs = 0;
        let mut running_since: Option<TimeMs> = None;

        for event in &self.events {
            match &event.kind {
                TraceKind::Started { pid: p, .. } if p == pid => {
                    running_since = Some(event.time_ms);
                }
                TraceKind::BurstCompleted { pid: p, .. }
                | TraceKind::Terminated { pid: p }
                | TraceKind::SlicePreempted { pid: p, .. }
                | TraceKind::ArrivedPreempting { running: p, .. }
                | TraceKind::IoCompletedPreempting { running: p, .. }
                    if p == pid =>
                {
                    if let Some(start) = running_since.take() {
                        total += event.time_ms - start;
                    }
                }
                _ => {}
            }
        }

        total
    }

    /// Write every line, newline-terminated.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for event in &self.events {
            writeln!(out, "{event}")?;
        }
        Ok(())
    }

    /// Pretty-print the trace to stderr for debugging.
    pub fn dump(&self) {
        for event in &self.events {
            eprintln!("{event}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(kind: TraceKind, queue: &str) -> String {
        let mut trace = Trace::new(Algorithm::Srt);
        trace.record(42, kind, queue.to_string());
        trace.lines().remove(0)
    }

    #[test]
    fn test_line_shapes() {
        assert_eq!(
            line(TraceKind::SimStarted, "<empty>"),
            "time 42ms: Simulator started for SRT [Q <empty>]"
        );
        assert_eq!(
            line(TraceKind::Arrived { pid: "A".into() }, "A"),
            "time 42ms: Process A arrived and added to ready queue [Q A]"
        );
        assert_eq!(
            line(
                TraceKind::ArrivedPreempting {
                    pid: "B".into(),
                    running: "A".into()
                },
                "<empty>"
            ),
            "time 42ms: Process B arrived and will preempt A [Q <empty>]"
        );
        assert_eq!(
            line(
                TraceKind::Started {
                    pid: "A".into(),
                    remaining: Some(12)
                },
                "B C"
            ),
            "time 42ms: Process A started using the CPU with 12ms remaining [Q B C]"
        );
        assert_eq!(
            line(
                TraceKind::SwitchedOutToIo {
                    pid: "A".into(),
                    until: 300
                },
                "<empty>"
            ),
            "time 42ms: Process A switched out of CPU; will block on I/O until time 300ms [Q <empty>]"
        );
        assert_eq!(
            line(TraceKind::SimEnded, "<empty>"),
            "time 42ms: Simulator ended for SRT [Q <empty>]"
        );
    }

    #[test]
    fn test_burst_plural() {
        let one = line(
            TraceKind::BurstCompleted {
                pid: "A".into(),
                bursts_left: 1,
            },
            "<empty>",
        );
        let two = line(
            TraceKind::BurstCompleted {
                pid: "A".into(),
                bursts_left: 2,
            },
            "<empty>",
        );
        assert!(one.contains("; 1 burst to go"), "{one}");
        assert!(two.contains("; 2 bursts to go"), "{two}");
    }

    #[test]
    fn test_cpu_time_and_counts() {
        let mut trace = Trace::new(Algorithm::Rr);
        let q = || "<empty>".to_string();
        trace.record(
            4,
            TraceKind::Started {
                pid: "A".into(),
                remaining: None,
            },
            q(),
        );
        trace.record(
            74,
            TraceKind::SlicePreempted {
                pid: "A".into(),
                remaining: 30,
            },
            q(),
        );
        trace.record(
            90,
            TraceKind::Started {
                pid: "A".into(),
                remaining: Some(30),
            },
            q(),
        );
        trace.record(120, TraceKind::Terminated { pid: "A".into() }, q());

        assert_eq!(trace.cpu_time("A"), 100);
        assert_eq!(trace.dispatch_count("A"), 2);
        assert_eq!(trace.preemption_count(), 1);
        assert_eq!(trace.termination_time("A"), Some(120));
        assert_eq!(trace.end_time(), 120);
        assert_eq!(trace.cpu_time("B"), 0);
    }
}
