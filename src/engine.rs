//! Event-driven simulation engine.
//!
//! This is the core of the simulator. It owns the simulated clock, the
//! process table, the event queue and the ready queue, and applies the
//! per-event transitions, dispatch and (for SRT) preemption.
//!
//! Each loop iteration pops the earliest event, advances the clock to it and
//! runs its handler. Dispatch from the ready queue is only attempted once
//! every event at the current timestamp has been handled.

use std::cell::Cell;
use std::collections::BTreeMap;

use tracing::{debug, info, trace};

use crate::event::{Event, EventKind, EventQueue};
use crate::process::{ProcState, Process};
use crate::ready::ReadyQueue;
use crate::scenario::{Scenario, SimConfig};
use crate::stats::RunStats;
use crate::trace::{Trace, TraceKind};
use crate::types::{Algorithm, ProcId, TimeMs};

thread_local! {
    static SIM_CLOCK: Cell<TimeMs> = const { Cell::new(0) };
    static SIM_ALGORITHM: Cell<Option<Algorithm>> = const { Cell::new(None) };
}

/// Simulated time of the run in progress on this thread (used by log
/// formatting).
pub fn sim_clock() -> TimeMs {
    SIM_CLOCK.with(|c| c.get())
}

fn set_sim_clock(now: TimeMs) {
    SIM_CLOCK.with(|c| c.set(now));
}

/// Algorithm of the run in progress on this thread, if any.
pub fn sim_algorithm() -> Option<Algorithm> {
    SIM_ALGORITHM.with(|c| c.get())
}

fn set_sim_algorithm(algorithm: Option<Algorithm>) {
    SIM_ALGORITHM.with(|c| c.set(algorithm));
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trace: Trace,
    pub stats: RunStats,
}

impl SimulationResult {
    /// Simulated time at which the last process left the system.
    pub fn end_time(&self) -> TimeMs {
        self.stats.end_time_ms
    }

    /// Rendered trace lines.
    pub fn lines(&self) -> Vec<String> {
        self.trace.lines()
    }
}

/// The main simulator.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    algorithm: Algorithm,
}

impl Simulator {
    pub fn new(algorithm: Algorithm) -> Self {
        Simulator { algorithm }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Run a scenario to completion and return its trace and statistics.
    ///
    /// # Panics
    /// Panics if the scenario fails [`Scenario::validate`]. Scenarios from
    /// [`Scenario::from_processes`] or the builder are already checked.
    pub fn run(&self, scenario: &Scenario) -> SimulationResult {
        if let Err(e) = scenario.validate() {
            panic!("cannot simulate an invalid scenario: {e}");
        }
        let mut state = SimState::new(self.algorithm, scenario);
        while state.step() {}
        state.finish()
    }
}

/// Mutable state of one run.
struct SimState {
    algorithm: Algorithm,
    config: SimConfig,
    now: TimeMs,
    /// Master process list; terminated processes are removed.
    procs: BTreeMap<ProcId, Process>,
    events: EventQueue,
    ready: ReadyQueue,
    /// The CPU's occupant, from dispatch until its burst ends or it is
    /// preempted. Set even while the occupant is still switching in.
    running: Option<ProcId>,
    trace: Trace,
    stats: RunStats,
}

impl SimState {
    /// Build the process table and seed one arrival per process.
    fn new(algorithm: Algorithm, scenario: &Scenario) -> Self {
        let mut procs = BTreeMap::new();
        let mut events = EventQueue::new();
        for (idx, spec) in scenario.processes.iter().enumerate() {
            let id = ProcId(idx);
            let process = Process::new(spec);
            events.push(Event::new(
                spec.arrival_ms,
                EventKind::Arrive,
                id,
                process.pid.clone(),
            ));
            procs.insert(id, process);
        }

        set_sim_clock(0);
        set_sim_algorithm(Some(algorithm));
        let mut state = SimState {
            algorithm,
            config: scenario.config,
            now: 0,
            procs,
            events,
            ready: ReadyQueue::for_algorithm(algorithm),
            running: None,
            trace: Trace::new(algorithm),
            stats: RunStats::new(algorithm),
        };
        info!(
            algorithm = %algorithm,
            processes = state.procs.len(),
            "simulation started"
        );
        state.record(TraceKind::SimStarted);
        state
    }

    /// Process the next event. Returns false once the queue is drained.
    fn step(&mut self) -> bool {
        let Some(event) = self.events.pop() else {
            return false;
        };
        assert!(
            event.time >= self.now,
            "event queue went back in time: {} < {}",
            event.time,
            self.now
        );
        self.now = event.time;
        set_sim_clock(self.now);
        trace!(pid = %event.pid, kind = ?event.kind, "event");

        match event.kind {
            EventKind::Arrive => self.handle_arrive(event.proc),
            EventKind::SwitchIn => self.handle_switch_in(event.proc),
            EventKind::FinishBurst => self.handle_finish_burst(event.proc),
            EventKind::FinishSlice => self.handle_finish_slice(event.proc),
            EventKind::SwitchOut => self.handle_switch_out(event.proc),
            EventKind::FinishBlocked => self.handle_finish_blocked(event.proc),
        }

        // Same-instant events must all land before a dispatch decision.
        if self
            .events
            .peek_min_time()
            .map_or(true, |next| next > self.now)
        {
            self.try_dispatch();
        }

        if cfg!(debug_assertions) {
            self.check_invariants();
        }
        true
    }

    fn finish(mut self) -> SimulationResult {
        assert!(
            self.procs.is_empty(),
            "event queue drained with {} process(es) still in the system",
            self.procs.len()
        );
        assert!(self.ready.is_empty(), "ready queue not empty at end of run");
        assert!(self.running.is_none(), "CPU still occupied at end of run");

        self.record(TraceKind::SimEnded);
        self.stats.end_time_ms = self.now;
        info!(
            algorithm = %self.algorithm,
            end_ms = self.now,
            context_switches = self.stats.context_switches,
            preemptions = self.stats.preemptions,
            "simulation ended"
        );
        set_sim_algorithm(None);
        SimulationResult {
            trace: self.trace,
            stats: self.stats,
        }
    }

    fn proc(&self, id: ProcId) -> &Process {
        self.procs
            .get(&id)
            .unwrap_or_else(|| panic!("event for process {} which left the system", id.0))
    }

    fn proc_mut(&mut self, id: ProcId) -> &mut Process {
        self.procs
            .get_mut(&id)
            .unwrap_or_else(|| panic!("event for process {} which left the system", id.0))
    }

    fn pid_of(&self, id: ProcId) -> String {
        self.proc(id).pid.to_string()
    }

    fn record(&mut self, kind: TraceKind) {
        self.trace.record(self.now, kind, self.ready.snapshot());
    }

    fn schedule(&mut self, at: TimeMs, kind: EventKind, id: ProcId) {
        let pid = self.proc(id).pid.clone();
        self.events.push(Event::new(at, kind, id, pid));
    }

    fn enqueue(&mut self, id: ProcId) {
        assert_ne!(
            self.running,
            Some(id),
            "the running process cannot join the ready queue"
        );
        let now = self.now;
        let p = self.proc_mut(id);
        p.state = ProcState::Ready;
        p.ready_since = Some(now);
        let (pid, remaining) = (p.pid.clone(), p.time_remaining);
        self.ready.push(id, pid, remaining);
    }

    fn handle_arrive(&mut self, id: ProcId) {
        let now = self.now;
        let p = self.proc_mut(id);
        p.burst_ready_at = now;
        let burst = p.burst_ms;
        let pid = p.pid.to_string();

        if let Some(victim) = self.preemption_target(burst) {
            let running = self.pid_of(victim);
            self.preempt(victim, id);
            self.record(TraceKind::ArrivedPreempting { pid, running });
        } else {
            self.enqueue(id);
            debug!(pid = %pid, "arrived");
            self.record(TraceKind::Arrived { pid });
        }
    }

    fn handle_switch_in(&mut self, id: ProcId) {
        assert_eq!(
            self.running,
            Some(id),
            "switch-in for a process that does not own the CPU"
        );
        let now = self.now;
        let slice = self.config.time_slice_ms;
        let round_robin = self.algorithm == Algorithm::Rr;

        let p = self.proc_mut(id);
        p.state = ProcState::Running;
        let remaining = p.time_remaining;
        let resuming = p.is_resuming();
        let pid = p.pid.to_string();

        if round_robin && slice < remaining {
            self.schedule(now + slice, EventKind::FinishSlice, id);
        } else {
            self.schedule(now + remaining, EventKind::FinishBurst, id);
        }
        self.stats.context_switches += 1;
        debug!(pid = %pid, remaining, "switched in");
        self.record(TraceKind::Started {
            pid,
            remaining: resuming.then_some(remaining),
        });
    }

    fn handle_finish_burst(&mut self, id: ProcId) {
        assert_eq!(
            self.running,
            Some(id),
            "burst completed for a process that does not own the CPU"
        );
        let half = self.config.half_switch_ms();
        let p = self.proc_mut(id);
        p.bursts_remaining -= 1;
        p.time_remaining = 0;
        p.state = ProcState::Blocked;
        let burst = p.burst_ms;
        let bursts_left = p.bursts_remaining;
        let pid = p.pid.to_string();

        self.stats.burst.add(burst);
        self.schedule(self.now + half, EventKind::SwitchOut, id);
        self.running = None;

        debug!(pid = %pid, bursts_left, "burst completed");
        if bursts_left == 0 {
            self.record(TraceKind::Terminated { pid });
        } else {
            self.record(TraceKind::BurstCompleted { pid, bursts_left });
        }
    }

    fn handle_finish_slice(&mut self, id: ProcId) {
        assert_eq!(
            self.running,
            Some(id),
            "slice expired for a process that does not own the CPU"
        );
        let now = self.now;
        let slice = self.config.time_slice_ms;
        let half = self.config.half_switch_ms();
        let queue_empty = self.ready.is_empty();

        let p = self.proc_mut(id);
        assert!(
            p.time_remaining > slice,
            "slice expiry scheduled for a burst that fits in the slice"
        );
        p.time_remaining -= slice;
        let remaining = p.time_remaining;
        let pid = p.pid.to_string();

        if queue_empty {
            // Nobody to yield to: run out the rest of the burst. The queue
            // is not consulted again before the burst ends.
            self.schedule(now + remaining, EventKind::FinishBurst, id);
            self.record(TraceKind::SliceExpiredNoPreemption { pid });
        } else {
            self.proc_mut(id).state = ProcState::Blocked;
            self.schedule(now + half, EventKind::SwitchOut, id);
            self.running = None;
            self.stats.preemptions += 1;
            debug!(pid = %pid, remaining, "slice expired, yielding");
            self.record(TraceKind::SlicePreempted { pid, remaining });
        }
    }

    fn handle_switch_out(&mut self, id: ProcId) {
        let now = self.now;
        let p = self.proc_mut(id);
        let pid = p.pid.to_string();

        if p.is_done() {
            let turnaround = now - p.burst_ready_at;
            self.procs.remove(&id);
            self.stats.turnaround.add(turnaround);
            debug!(pid = %pid, "left the system");
            self.record(TraceKind::SwitchedOutRemoved { pid });
        } else if p.time_remaining == 0 {
            let turnaround = now - p.burst_ready_at;
            p.time_remaining = p.burst_ms;
            p.state = ProcState::Blocked;
            let until = now + p.io_ms;
            self.stats.turnaround.add(turnaround);
            self.schedule(until, EventKind::FinishBlocked, id);
            self.record(TraceKind::SwitchedOutToIo { pid, until });
        } else {
            self.enqueue(id);
            self.record(TraceKind::SwitchedOutToReady { pid });
        }
    }

    fn handle_finish_blocked(&mut self, id: ProcId) {
        let now = self.now;
        let p = self.proc_mut(id);
        p.state = ProcState::Ready;
        p.burst_ready_at = now;
        let remaining = p.time_remaining;
        let pid = p.pid.to_string();

        if let Some(victim) = self.preemption_target(remaining) {
            let running = self.pid_of(victim);
            self.preempt(victim, id);
            self.record(TraceKind::IoCompletedPreempting { pid, running });
        } else {
            self.enqueue(id);
            self.record(TraceKind::IoCompleted { pid });
        }
    }

    /// The process an incoming process needing `needed` ms would preempt.
    ///
    /// SRT only. The occupant must be executing, i.e. have its burst
    /// completion pending; an occupant still switching in keeps the CPU.
    fn preemption_target(&self, needed: TimeMs) -> Option<ProcId> {
        if !self.algorithm.orders_by_remaining() {
            return None;
        }
        let running = self.running?;
        if needed >= self.proc(running).time_remaining {
            return None;
        }
        let executing = self
            .events
            .any(|e| e.proc == running && e.kind == EventKind::FinishBurst);
        executing.then_some(running)
    }

    /// Hand the CPU from `victim` to `incoming`.
    ///
    /// The victim pays the switch-out half now; the incoming process starts
    /// after the full context switch. `incoming` owns the CPU immediately so
    /// later comparisons see it.
    fn preempt(&mut self, victim: ProcId, incoming: ProcId) {
        let now = self.now;
        let half = self.config.half_switch_ms();
        let full = self.config.context_switch_ms;

        let obligation = self
            .events
            .remove_where(|e| e.proc == victim && e.kind == EventKind::FinishBurst)
            .unwrap_or_else(|| {
                panic!(
                    "missing FinishBurst obligation for preempted process {}",
                    victim.0
                )
            });
        let v = self.proc_mut(victim);
        v.time_remaining = obligation.time - now;
        v.state = ProcState::Blocked;
        debug!(
            pid = %v.pid,
            remaining = v.time_remaining,
            "preempted"
        );

        self.schedule(now + half, EventKind::SwitchOut, victim);
        self.proc_mut(incoming).state = ProcState::Running;
        self.schedule(now + full, EventKind::SwitchIn, incoming);
        self.running = Some(incoming);
        self.stats.preemptions += 1;
    }

    /// Commit the idle CPU to the head of the ready queue.
    fn try_dispatch(&mut self) {
        if self.running.is_some() {
            return;
        }
        if self
            .events
            .any(|e| e.kind == EventKind::SwitchOut)
        {
            return;
        }
        let Some(id) = self.ready.pop() else {
            return;
        };

        let now = self.now;
        let half = self.config.half_switch_ms();
        let p = self.proc_mut(id);
        p.state = ProcState::Running;
        let waited = p.ready_since.take().map(|since| now - since);
        debug!(pid = %p.pid, "dispatch");

        if let Some(waited) = waited {
            self.stats.wait.add(waited);
        }
        self.schedule(now + half, EventKind::SwitchIn, id);
        self.running = Some(id);
    }

    /// Single occupancy and bounded in-flight obligations.
    fn check_invariants(&self) {
        let running_count = self
            .procs
            .values()
            .filter(|p| p.state == ProcState::Running)
            .count();
        match self.running {
            Some(id) => {
                assert_eq!(running_count, 1, "exactly one process must be running");
                assert_eq!(self.proc(id).state, ProcState::Running);
                assert!(
                    !self.ready.contains(id),
                    "running process found in the ready queue"
                );
            }
            None => assert_eq!(running_count, 0, "running process without the CPU"),
        }
        for id in self.ready.ordered_procs() {
            assert_eq!(
                self.proc(id).state,
                ProcState::Ready,
                "non-ready process in the ready queue"
            );
        }
        assert!(
            self.events
                .count_where(|e| e.kind.is_burst_obligation())
                <= 1,
            "more than one burst obligation in flight"
        );
        assert!(
            self.events.count_where(|e| e.kind == EventKind::SwitchOut) <= 1,
            "more than one switch-out in flight"
        );
    }
}
