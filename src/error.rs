use thiserror::Error;

/// Errors surfaced to callers of the simulator.
///
/// Broken engine invariants are not represented here: those panic, since
/// they mean the state machine reached a configuration it cannot reach.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A process descriptor could not be parsed or violates a constraint.
    #[error("invalid process spec on line {line}: {reason}")]
    InvalidProcessSpec {
        /// 1-based line number in the input, or 0 when not read from text.
        line: usize,
        /// What was wrong with the descriptor.
        reason: String,
    },

    /// The system parameters cannot be simulated.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl SimError {
    pub(crate) fn invalid(line: usize, reason: impl Into<String>) -> Self {
        SimError::InvalidProcessSpec {
            line,
            reason: reason.into(),
        }
    }
}

/// A type alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
