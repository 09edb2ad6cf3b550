pub mod driver;
pub mod job;
pub mod result;

pub use driver::{Sim, SimConfig};
pub use job::{Process, Workload, validate_workload};
pub use result::{AggregateResult, Column, ResultTable, Schedule, Segment, SimulationResult, Timeline};
