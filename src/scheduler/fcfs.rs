use super::{Algorithm, SchedulingEngine};
use crate::{
    core::{SchedError, Ticks},
    sim::{Process, ResultTable, Schedule, SimulationResult, Timeline, validate_workload},
};

/// First-come, first-served over the submission order.
///
/// Callers are expected to submit processes sorted by arrival time. Each
/// process starts once it has arrived and the previous one has released the
/// CPU; the CPU idles across any gap in between.
pub struct Fcfs;

impl SchedulingEngine for Fcfs {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fcfs
    }

    fn schedule(&self, processes: &[Process]) -> Result<Schedule, SchedError> {
        validate_workload(processes)?;

        let mut timeline = Timeline::new();
        let mut rows = Vec::with_capacity(processes.len());
        let mut cpu_free: Ticks = 0;

        for p in processes {
            let start = cpu_free.max(p.arrival());
            timeline.push_idle(cpu_free, start);

            let completion = start + p.burst();
            timeline.push_run(p.id(), start, completion);
            rows.push(SimulationResult::from_completion(p, start, completion));
            log::debug!("fcfs: P{} runs {start}..{completion}", p.id());

            cpu_free = completion;
        }

        Ok(Schedule {
            algorithm: self.algorithm(),
            table: ResultTable::new(self.algorithm().name(), rows)?,
            timeline,
        })
    }
}
