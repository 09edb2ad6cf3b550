pub mod fcfs;
pub mod priority;
pub mod round_robin;

use std::{fmt, str::FromStr};

use crate::{
    core::{SchedError, Ticks},
    sim::{Process, Schedule},
};
pub use fcfs::Fcfs;
pub use priority::PriorityScheduler;
pub use round_robin::RoundRobin;

/// A scheduling discipline over a single CPU.
///
/// Engines are pure: they read the processes, keep their working state local
/// to one `schedule` call, and return the same `Schedule` for the same input.
pub trait SchedulingEngine {
    fn algorithm(&self) -> Algorithm;

    fn schedule(&self, processes: &[Process]) -> Result<Schedule, SchedError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Fcfs,
    Priority,
    RoundRobin { quantum: Ticks },
}

impl Algorithm {
    /// Short engine name used in logs and error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Priority => "priority",
            Self::RoundRobin { .. } => "round-robin",
        }
    }

    pub fn engine(&self) -> Result<Box<dyn SchedulingEngine + Send + Sync>, SchedError> {
        Ok(match *self {
            Self::Fcfs => Box::new(Fcfs),
            Self::Priority => Box::new(PriorityScheduler),
            Self::RoundRobin { quantum } => Box::new(RoundRobin::new(quantum)?),
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fcfs => write!(f, "First-Come, First-Served"),
            Self::Priority => write!(f, "Priority (non-preemptive)"),
            Self::RoundRobin { quantum } => write!(f, "Round Robin (quantum {quantum})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAlgorithmError {
    input: String,
}

impl fmt::Display for ParseAlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown scheduler '{}': expected F, P, R<quantum>, fcfs, priority or rr:<quantum>",
            self.input
        )
    }
}

impl std::error::Error for ParseAlgorithmError {}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    /// Accepts `F`, `P`, `R<quantum>` and the long forms `fcfs`, `priority`,
    /// `rr:<quantum>`. The quantum is range-checked by the engine, not here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAlgorithmError {
            input: s.to_owned(),
        };
        let s = s.trim();

        match s {
            "F" | "fcfs" => return Ok(Self::Fcfs),
            "P" | "priority" => return Ok(Self::Priority),
            _ => {}
        }

        let quantum = s
            .strip_prefix("rr:")
            .or_else(|| s.strip_prefix('R'))
            .ok_or_else(err)?;
        quantum
            .parse::<Ticks>()
            .map(|quantum| Self::RoundRobin { quantum })
            .map_err(|_| err())
    }
}
