use std::fmt;

use crate::core::{ProcessId, Ticks};

/// Coarse classification of a [`SchedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a workload or configuration the engines reject.
    InvalidInput,
    /// An engine produced a result that breaks its own invariants.
    InternalInvariantViolation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// No processes were supplied.
    EmptyWorkload,
    /// Burst time must be strictly positive.
    NonPositiveBurst { id: ProcessId, burst: Ticks },
    /// Arrival time must not be negative.
    NegativeArrival { id: ProcessId, arrival: Ticks },
    /// Round-robin quantum must be strictly positive.
    NonPositiveQuantum { quantum: Ticks },
    /// Parallel input columns have different lengths.
    LengthMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    /// Process ids start at 1.
    InvalidId { id: ProcessId },
    /// Two processes share an id.
    DuplicateId { id: ProcessId },
    /// The simulated timeline, or a total over it, would not fit in `Ticks`.
    TimeOverflow {
        last_arrival: Ticks,
        total_burst: Ticks,
        count: usize,
    },
    /// An engine computed an impossible value for a process.
    InvariantViolation {
        algorithm: &'static str,
        id: ProcessId,
        detail: String,
    },
}

impl SchedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvariantViolation { .. } => ErrorKind::InternalInvariantViolation,
            _ => ErrorKind::InvalidInput,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    pub(crate) fn invariant(algorithm: &'static str, id: ProcessId, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            algorithm,
            id,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorkload => write!(f, "workload must contain at least one process"),
            Self::NonPositiveBurst { id, burst } => {
                write!(f, "process P{id}: burst time must be positive (got {burst})")
            }
            Self::NegativeArrival { id, arrival } => {
                write!(f, "process P{id}: arrival time must not be negative (got {arrival})")
            }
            Self::NonPositiveQuantum { quantum } => {
                write!(f, "time quantum must be positive (got {quantum})")
            }
            Self::LengthMismatch {
                field,
                found,
                expected,
            } => write!(f, "{field} column has {found} entries, expected {expected}"),
            Self::InvalidId { id } => write!(f, "process id must be at least 1 (got {id})"),
            Self::DuplicateId { id } => write!(f, "process id P{id} appears more than once"),
            Self::TimeOverflow {
                last_arrival,
                total_burst,
                count,
            } => write!(
                f,
                "workload too long to simulate: last arrival {last_arrival} + total burst {total_burst} over {count} processes overflows"
            ),
            Self::InvariantViolation {
                algorithm,
                id,
                detail,
            } => write!(f, "{algorithm} engine invariant violated for P{id}: {detail}"),
        }
    }
}

impl std::error::Error for SchedError {}
