//! CPU scheduling simulator.
//!
//! Three single-CPU disciplines share one [`SchedulingEngine`] contract:
//! first-come first-served, non-preemptive priority, and preemptive
//! round-robin with a fixed quantum. Each engine turns a process set into a
//! [`Schedule`]: a per-process result table, the two averages, and the
//! execution timeline.

pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{ErrorKind, ProcessId, SchedError, SchedEvent, Ticks};
pub use scheduler::{Algorithm, Fcfs, PriorityScheduler, RoundRobin, SchedulingEngine};
pub use sim::{
    AggregateResult, Process, ResultTable, Schedule, Sim, SimConfig, SimulationResult, Timeline,
    Workload,
};
