#![allow(dead_code)]

use schedsim::{Algorithm, Scenario, SimulationResult, Simulator, TimeMs, Trace, TraceKind};

/// Initialize tracing from `RUST_LOG`.
///
/// `init_tracing()` is idempotent: the first call in the process installs
/// the subscriber, later calls are ignored.
pub fn setup_test() {
    schedsim::init_tracing();
}

/// Run `scenario` under `algo`, dumping the trace when `RUST_LOG` is set.
pub fn simulate(algo: Algorithm, scenario: &Scenario) -> SimulationResult {
    let result = Simulator::new(algo).run(scenario);
    if std::env::var_os("RUST_LOG").is_some() {
        result.trace.dump();
    }
    result
}

/// A mixed workload: long and short bursts, I/O, staggered arrivals.
pub fn mixed_workload() -> Scenario {
    Scenario::builder()
        .add_process("A", 0, 168, 5, 287)
        .add_process("B", 0, 385, 1, 0)
        .add_process("C", 190, 97, 5, 2499)
        .add_process("D", 250, 1770, 2, 822)
        .add_process("E", 250, 30, 3, 0)
        .build()
}

/// Execution intervals `(pid, start, end)` reconstructed from the trace.
///
/// A process executes from `Started` until its burst completes, it
/// terminates, its slice expires with a yield, or another process preempts
/// it.
pub fn execution_intervals(trace: &Trace) -> Vec<(String, TimeMs, TimeMs)> {
    let mut open: Option<(String, TimeMs)> = None;
    let mut intervals = Vec::new();
    for event in trace.events() {
        let stopped = match &event.kind {
            TraceKind::Started { pid, .. } => {
                assert!(
                    open.is_none(),
                    "{pid} started at {}ms while {:?} was executing",
                    event.time_ms,
                    open
                );
                open = Some((pid.clone(), event.time_ms));
                None
            }
            TraceKind::BurstCompleted { pid, .. }
            | TraceKind::Terminated { pid }
            | TraceKind::SlicePreempted { pid, .. }
            | TraceKind::ArrivedPreempting { running: pid, .. }
            | TraceKind::IoCompletedPreempting { running: pid, .. } => Some(pid.clone()),
            _ => None,
        };
        if let Some(pid) = stopped {
            let (running, start) = open.take().expect("stop without a running process");
            assert_eq!(running, pid, "stopped a process that was not executing");
            intervals.push((pid, start, event.time_ms));
        }
    }
    assert!(open.is_none(), "process still executing at end of trace");
    intervals
}

/// Pids in a rendered queue snapshot.
pub fn queue_pids(queue: &str) -> Vec<&str> {
    if queue == "<empty>" {
        Vec::new()
    } else {
        queue.split(' ').collect()
    }
}
