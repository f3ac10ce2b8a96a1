//! Scenario definition and builder API.

use static_assertions::const_assert;

use crate::error::{SimError, SimResult};
use crate::process::ProcessSpec;
use crate::types::TimeMs;

/// Full context-switch cost: half is paid switching out, half switching in.
pub const CONTEXT_SWITCH_MS: TimeMs = 8;

/// Round-robin time slice.
pub const TIME_SLICE_MS: TimeMs = 70;

const_assert!(CONTEXT_SWITCH_MS % 2 == 0);
const_assert!(TIME_SLICE_MS > 0);

/// Fixed system parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub context_switch_ms: TimeMs,
    pub time_slice_ms: TimeMs,
}

impl SimConfig {
    /// Cost of one half of a context switch.
    pub fn half_switch_ms(&self) -> TimeMs {
        self.context_switch_ms / 2
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            context_switch_ms: CONTEXT_SWITCH_MS,
            time_slice_ms: TIME_SLICE_MS,
        }
    }
}

/// A complete simulation input: processes plus system parameters.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub processes: Vec<ProcessSpec>,
    pub config: SimConfig,
}

/// Builder for constructing scenarios.
pub struct ScenarioBuilder {
    processes: Vec<ProcessSpec>,
    config: SimConfig,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder {
            processes: Vec::new(),
            config: SimConfig::default(),
        }
    }

    /// A scenario with the default system parameters, validating every
    /// descriptor.
    pub fn from_processes(processes: Vec<ProcessSpec>) -> SimResult<Self> {
        let scenario = Scenario {
            processes,
            config: SimConfig::default(),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the parameters, every descriptor, pid uniqueness, and that
    /// simulated time cannot overflow.
    pub fn validate(&self) -> SimResult<()> {
        if self.config.time_slice_ms == 0 {
            return Err(SimError::InvalidConfig {
                reason: "time slice must be positive".to_string(),
            });
        }
        crate::input::validate_specs(&self.processes, self.config)
    }
}

impl ScenarioBuilder {
    /// Add a process with a full `ProcessSpec`.
    pub fn process(mut self, spec: ProcessSpec) -> Self {
        self.processes.push(spec);
        self
    }

    /// Convenience: add a process from its fields.
    pub fn add_process(
        self,
        pid: &str,
        arrival_ms: TimeMs,
        burst_ms: TimeMs,
        num_bursts: u32,
        io_ms: TimeMs,
    ) -> Self {
        self.process(ProcessSpec::new(pid, arrival_ms, burst_ms, num_bursts, io_ms))
    }

    /// Override the full context-switch time.
    pub fn context_switch_ms(mut self, ms: TimeMs) -> Self {
        self.config.context_switch_ms = ms;
        self
    }

    /// Override the round-robin time slice.
    pub fn time_slice_ms(mut self, ms: TimeMs) -> Self {
        self.config.time_slice_ms = ms;
        self
    }

    /// Build the scenario.
    ///
    /// # Panics
    /// Panics on an invalid descriptor or a zero time slice. Use
    /// [`Scenario::from_processes`] for untrusted input.
    pub fn build(self) -> Scenario {
        let scenario = Scenario {
            processes: self.processes,
            config: self.config,
        };
        if let Err(e) = scenario.validate() {
            panic!("invalid scenario: {e}");
        }
        scenario
    }
}

/// Running upper bound on how far simulated time can advance.
///
/// Each process adds its CPU time, its I/O time and the context switches its
/// bursts can cost: one per time slice plus one for a preemption it causes.
/// The CPU only idles before the last arrival or while some process does
/// I/O, so `latest arrival + total` bounds every event time. Wait and
/// turnaround totals grow by at most that bound per process, so the bound
/// times the process count must fit as well.
pub(crate) struct Horizon {
    config: SimConfig,
    latest_arrival: TimeMs,
    total: TimeMs,
    processes: u64,
}

impl Horizon {
    pub(crate) fn new(config: SimConfig) -> Self {
        Horizon {
            config,
            latest_arrival: 0,
            total: 0,
            processes: 0,
        }
    }

    /// Account for one more process. `line` is only used for error
    /// reporting.
    pub(crate) fn add(&mut self, spec: &ProcessSpec, line: usize) -> SimResult<()> {
        let overflow = || {
            SimError::invalid(
                line,
                format!(
                    "process {}: timing values overflow the simulated clock",
                    spec.pid
                ),
            )
        };

        let bursts = u64::from(spec.num_bursts);
        let work = spec
            .burst_ms
            .div_ceil(self.config.time_slice_ms)
            .checked_add(2)
            .and_then(|switches| switches.checked_mul(self.config.context_switch_ms))
            .and_then(|cs| cs.checked_add(spec.burst_ms))
            .and_then(|per_burst| per_burst.checked_mul(bursts))
            .and_then(|cpu| {
                spec.io_ms
                    .checked_mul(bursts.saturating_sub(1))?
                    .checked_add(cpu)
            })
            .ok_or_else(overflow)?;

        let total = self.total.checked_add(work).ok_or_else(overflow)?;
        let latest_arrival = self.latest_arrival.max(spec.arrival_ms);
        let processes = self.processes + 1;
        latest_arrival
            .checked_add(total)
            .and_then(|end| end.checked_mul(processes))
            .ok_or_else(overflow)?;

        self.latest_arrival = latest_arrival;
        self.total = total;
        self.processes = processes;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.context_switch_ms, 8);
        assert_eq!(config.half_switch_ms(), 4);
        assert_eq!(config.time_slice_ms, 70);
    }

    #[test]
    fn test_builder_overrides() {
        let scenario = Scenario::builder()
            .add_process("A", 0, 10, 1, 0)
            .context_switch_ms(4)
            .time_slice_ms(5)
            .build();
        assert_eq!(scenario.processes.len(), 1);
        assert_eq!(scenario.config.half_switch_ms(), 2);
        assert_eq!(scenario.config.time_slice_ms, 5);
    }

    #[test]
    #[should_panic(expected = "invalid scenario")]
    fn test_builder_rejects_duplicate_pid() {
        Scenario::builder()
            .add_process("A", 0, 10, 1, 0)
            .add_process("A", 5, 10, 1, 0)
            .build();
    }

    #[test]
    fn test_from_processes_reports_error() {
        let err = Scenario::from_processes(vec![ProcessSpec::new("A", 0, 0, 1, 0)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_slice() {
        let scenario = Scenario {
            processes: vec![ProcessSpec::new("A", 0, 10, 1, 0)],
            config: SimConfig {
                context_switch_ms: CONTEXT_SWITCH_MS,
                time_slice_ms: 0,
            },
        };
        assert!(matches!(
            scenario.validate(),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_clock_overflow() {
        let err = Scenario::from_processes(vec![
            ProcessSpec::new("A", 0, 5, 1, 0),
            ProcessSpec::new("B", TimeMs::MAX - 1, 5, 1, 0),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("process B: timing values overflow"));
    }

    #[test]
    fn test_horizon_accepts_large_values() {
        let mut horizon = Horizon::new(SimConfig::default());
        horizon
            .add(&ProcessSpec::new("A", 1 << 40, 1 << 20, 1_000, 1 << 30), 1)
            .unwrap();
        horizon
            .add(&ProcessSpec::new("B", 0, 70, u32::MAX, 0), 2)
            .unwrap();
        assert!(horizon
            .add(&ProcessSpec::new("C", 0, 5, 2, TimeMs::MAX), 3)
            .is_err());
    }
}
