//! The ready queue.
//!
//! Works in one of two orderings, fixed at construction: plain FIFO for
//! FCFS and RR, or ascending remaining burst time for SRT. Iteration order
//! is always the dispatch order.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use itertools::Itertools;

use crate::types::{Algorithm, ProcId, TimeMs};

/// Ordering key for the shortest-remaining mode: remaining time captured at
/// insertion, then pid.
type RemainingKey = (TimeMs, Rc<str>);

#[derive(Debug)]
enum Order {
    /// Insertion order.
    Fifo(VecDeque<(ProcId, Rc<str>)>),
    /// Ascending remaining time, ties by pid.
    Remaining(BTreeMap<RemainingKey, ProcId>),
}

/// Processes waiting for the CPU.
#[derive(Debug)]
pub struct ReadyQueue {
    order: Order,
}

impl ReadyQueue {
    /// A FIFO queue.
    pub fn fifo() -> Self {
        ReadyQueue {
            order: Order::Fifo(VecDeque::new()),
        }
    }

    /// A queue ordered by remaining burst time.
    pub fn shortest_remaining() -> Self {
        ReadyQueue {
            order: Order::Remaining(BTreeMap::new()),
        }
    }

    /// The queue discipline `algo` dispatches from.
    pub fn for_algorithm(algo: Algorithm) -> Self {
        if algo.orders_by_remaining() {
            Self::shortest_remaining()
        } else {
            Self::fifo()
        }
    }

    /// Insert a process. `remaining` is only consulted in shortest-remaining
    /// mode.
    ///
    /// # Panics
    /// Panics if the process is already queued.
    pub fn push(&mut self, proc: ProcId, pid: Rc<str>, remaining: TimeMs) {
        assert!(
            !self.contains(proc),
            "process {pid} inserted into the ready queue twice"
        );
        match &mut self.order {
            Order::Fifo(entries) => entries.push_back((proc, pid)),
            Order::Remaining(entries) => {
                entries.insert((remaining, pid), proc);
            }
        }
    }

    /// Remove and return the next process to dispatch.
    pub fn pop(&mut self) -> Option<ProcId> {
        match &mut self.order {
            Order::Fifo(entries) => entries.pop_front().map(|(proc, _)| proc),
            Order::Remaining(entries) => entries.pop_first().map(|(_, proc)| proc),
        }
    }

    pub fn contains(&self, proc: ProcId) -> bool {
        match &self.order {
            Order::Fifo(entries) => entries.iter().any(|(p, _)| *p == proc),
            Order::Remaining(entries) => entries.values().any(|p| *p == proc),
        }
    }

    pub fn len(&self) -> usize {
        match &self.order {
            Order::Fifo(entries) => entries.len(),
            Order::Remaining(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles in dispatch order, without consuming.
    pub fn ordered_procs(&self) -> Vec<ProcId> {
        match &self.order {
            Order::Fifo(entries) => entries.iter().map(|(p, _)| *p).collect(),
            Order::Remaining(entries) => entries.values().copied().collect(),
        }
    }

    /// Pids in dispatch order.
    pub fn ordered_pids(&self) -> Vec<Rc<str>> {
        match &self.order {
            Order::Fifo(entries) => entries.iter().map(|(_, pid)| pid.clone()).collect(),
            Order::Remaining(entries) => entries.keys().map(|(_, pid)| pid.clone()).collect(),
        }
    }

    /// The queue as it appears in trace lines: space-separated pids, or
    /// `<empty>`.
    pub fn snapshot(&self) -> String {
        if self.is_empty() {
            "<empty>".to_string()
        } else {
            self.ordered_pids().iter().join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn test_fifo_keeps_insertion_order() {
        let mut q = ReadyQueue::fifo();
        q.push(ProcId(2), pid("C"), 5);
        q.push(ProcId(0), pid("A"), 50);
        q.push(ProcId(1), pid("B"), 1);

        assert_eq!(q.snapshot(), "C A B");
        assert_eq!(q.pop(), Some(ProcId(2)));
        assert_eq!(q.pop(), Some(ProcId(0)));
        assert_eq!(q.pop(), Some(ProcId(1)));
        assert_eq!(q.pop(), None);
        assert_eq!(q.snapshot(), "<empty>");
    }

    #[test]
    fn test_shortest_remaining_order_and_pid_tiebreak() {
        let mut q = ReadyQueue::shortest_remaining();
        q.push(ProcId(0), pid("A"), 30);
        q.push(ProcId(3), pid("D"), 10);
        q.push(ProcId(1), pid("B"), 10);
        q.push(ProcId(2), pid("C"), 20);

        assert_eq!(q.snapshot(), "B D C A");
        assert_eq!(
            q.ordered_procs(),
            vec![ProcId(1), ProcId(3), ProcId(2), ProcId(0)]
        );
        assert_eq!(q.pop(), Some(ProcId(1)));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_for_algorithm() {
        let mut q = ReadyQueue::for_algorithm(Algorithm::Srt);
        q.push(ProcId(0), pid("A"), 9);
        q.push(ProcId(1), pid("B"), 3);
        assert_eq!(q.pop(), Some(ProcId(1)));

        let mut q = ReadyQueue::for_algorithm(Algorithm::Rr);
        q.push(ProcId(0), pid("A"), 9);
        q.push(ProcId(1), pid("B"), 3);
        assert_eq!(q.pop(), Some(ProcId(0)));
    }

    #[test]
    #[should_panic(expected = "twice")]
    fn test_double_insert_panics() {
        let mut q = ReadyQueue::fifo();
        q.push(ProcId(0), pid("A"), 1);
        q.push(ProcId(0), pid("A"), 1);
    }
}
