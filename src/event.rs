//! Simulation events and the time-ordered event queue.
//!
//! The queue is the simulator's clock source: the engine only ever advances
//! time to the timestamp of the event it pops. Ordering is defined by
//! [`cmp_events`] rather than by `Ord` on the event itself, so the tie-break
//! rules live in one function that can be tested on its own.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::types::{ProcId, TimeMs};

/// What happens when an event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The process enters the system.
    Arrive,
    /// The first half of a context switch completed; the process starts executing.
    SwitchIn,
    /// The running process's CPU burst completed.
    FinishBurst,
    /// The running process's time slice expired before its burst completed.
    FinishSlice,
    /// The second half of a context switch completed; the CPU is free.
    SwitchOut,
    /// The process's I/O completed.
    FinishBlocked,
}

impl EventKind {
    /// Tie-break rank for events at the same timestamp (lower fires first).
    ///
    /// Completions are handled before switches, and switches before new
    /// arrivals.
    pub fn priority(self) -> u8 {
        match self {
            EventKind::FinishBurst => 0,
            EventKind::FinishBlocked => 1,
            EventKind::FinishSlice => 2,
            EventKind::SwitchIn => 3,
            EventKind::SwitchOut => 4,
            EventKind::Arrive => 5,
        }
    }

    /// Whether this event is the completion obligation of a running burst.
    pub fn is_burst_obligation(self) -> bool {
        matches!(self, EventKind::FinishBurst | EventKind::FinishSlice)
    }
}

/// A simulation event: fires at `time` for the process behind `proc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub time: TimeMs,
    pub kind: EventKind,
    pub proc: ProcId,
    /// The process's textual id, the final tie-breaker.
    pub pid: Rc<str>,
}

impl Event {
    pub fn new(time: TimeMs, kind: EventKind, proc: ProcId, pid: Rc<str>) -> Self {
        Event {
            time,
            kind,
            proc,
            pid,
        }
    }
}

/// Total order for event extraction: ascending time, then kind priority,
/// then pid.
pub fn cmp_events(a: &Event, b: &Event) -> Ordering {
    a.time
        .cmp(&b.time)
        .then_with(|| a.kind.priority().cmp(&b.kind.priority()))
        .then_with(|| a.pid.cmp(&b.pid))
}

/// Heap entry. `BinaryHeap` is a max-heap, so the order is inverted here.
#[derive(Debug)]
struct Pending(Event);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_events(&other.0, &self.0)
    }
}

/// A priority queue of pending events, earliest first.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Pending>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event.
    pub fn push(&mut self, event: Event) {
        self.heap.push(Pending(event));
    }

    /// Remove and return the earliest event, or `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Pending(e)| e)
    }

    /// Timestamp of the next event without removing it.
    pub fn peek_min_time(&self) -> Option<TimeMs> {
        self.heap.peek().map(|p| p.0.time)
    }

    /// Remove at most one event matching `pred` and return it.
    ///
    /// Linear in the queue size; only used to cancel a preempted burst.
    pub fn remove_where<F>(&mut self, pred: F) -> Option<Event>
    where
        F: Fn(&Event) -> bool,
    {
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let removed = entries
            .iter()
            .position(|p| pred(&p.0))
            .map(|idx| entries.swap_remove(idx).0);
        self.heap = BinaryHeap::from(entries);
        removed
    }

    /// Number of pending events matching `pred`.
    pub fn count_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&Event) -> bool,
    {
        self.heap.iter().filter(|p| pred(&p.0)).count()
    }

    /// Whether any pending event matches `pred`.
    pub fn any<F>(&self, pred: F) -> bool
    where
        F: Fn(&Event) -> bool,
    {
        self.heap.iter().any(|p| pred(&p.0))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
