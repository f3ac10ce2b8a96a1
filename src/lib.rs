//! schedsim - Deterministic discrete-event simulator for single-CPU process
//! scheduling.
//!
//! Simulates First-Come-First-Served, preemptive Shortest-Remaining-Time and
//! Round-Robin scheduling over a list of processes that alternate CPU bursts
//! and I/O, producing a timestamped trace of every scheduling decision.
//!
//! # Architecture
//!
//! - **Engine**: Event loop, per-event transitions, dispatch and preemption
//! - **Events**: Time-ordered event queue with a fixed same-instant tie-break
//! - **Ready queue**: FIFO (FCFS, RR) or shortest-remaining-first (SRT)
//! - **Trace**: One line per observable transition
//! - **Stats**: Burst, wait and turnaround averages per run
//!
//! # Usage
//!
//! ```rust
//! use schedsim::*;
//!
//! let scenario = Scenario::builder()
//!     .add_process("A", 0, 5, 1, 0)
//!     .add_process("B", 0, 3, 1, 0)
//!     .build();
//!
//! let result = Simulator::new(Algorithm::Fcfs).run(&scenario);
//! assert_eq!(result.end_time(), 24);
//! for line in result.lines() {
//!     println!("{line}");
//! }
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod fmt;
pub mod input;
pub mod process;
pub mod ready;
pub mod scenario;
pub mod stats;
pub mod trace;
pub mod types;

// Re-export the main public types for convenience.
pub use engine::{sim_algorithm, sim_clock, SimulationResult, Simulator};
pub use error::{SimError, SimResult};
pub use event::{cmp_events, Event, EventKind, EventQueue};
pub use fmt::{init_tracing, FmtTs, SimFormat};
pub use input::parse_processes;
pub use process::{ProcState, Process, ProcessSpec};
pub use ready::ReadyQueue;
pub use scenario::{Scenario, SimConfig, CONTEXT_SWITCH_MS, TIME_SLICE_MS};
pub use stats::{write_report, write_report_json, DistributionStats, RunStats, StatsSummary};
pub use trace::{Trace, TraceEvent, TraceKind};
pub use types::{Algorithm, ProcId, TimeMs};
