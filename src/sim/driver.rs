use std::thread;

use super::{job::Workload, result::Schedule};
use crate::{
    core::{SchedError, SchedEvent},
    scheduler::{Algorithm, RoundRobin},
};

/// Immutable run configuration, fixed before the simulation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub algorithm: Algorithm,
}

impl SimConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

pub struct Sim {
    config: SimConfig,
}

impl Sim {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self, workload: &Workload) -> Result<Schedule, SchedError> {
        let engine = self.config.algorithm.engine()?;
        log::debug!(
            "running {} over {} processes",
            self.config.algorithm.name(),
            workload.len()
        );
        engine.schedule(workload.processes())
    }

    /// Round-robin event log; other algorithms have no intermediate states.
    pub fn trace(&self, workload: &Workload) -> Option<Result<Vec<SchedEvent>, SchedError>> {
        match self.config.algorithm {
            Algorithm::RoundRobin { quantum } => Some(
                RoundRobin::new(quantum).and_then(|rr| rr.trace(workload.processes())),
            ),
            _ => None,
        }
    }

    /// Runs each algorithm over the same workload on its own thread. Results
    /// come back in the order the algorithms were given.
    pub fn compare(
        workload: &Workload,
        algorithms: &[Algorithm],
    ) -> Vec<Result<Schedule, SchedError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = algorithms
                .iter()
                .map(|&algorithm| scope.spawn(move || Sim::new(SimConfig::new(algorithm)).run(workload)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Process;

    fn workload() -> Workload {
        Workload::new(vec![
            Process::with_priority(1, 0, 5, 2),
            Process::with_priority(2, 1, 3, 1),
            Process::with_priority(3, 2, 8, 3),
        ])
        .unwrap()
    }

    #[test]
    fn compare_keeps_request_order() {
        let algorithms = [
            Algorithm::RoundRobin { quantum: 2 },
            Algorithm::Fcfs,
            Algorithm::Priority,
        ];
        let results = Sim::compare(&workload(), &algorithms);
        let got: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().algorithm)
            .collect();
        assert_eq!(got, algorithms);
    }

    #[test]
    fn compare_matches_sequential_runs() {
        let algorithms = [Algorithm::Fcfs, Algorithm::RoundRobin { quantum: 3 }];
        let parallel = Sim::compare(&workload(), &algorithms);
        for (algorithm, result) in algorithms.iter().zip(parallel) {
            let sequential = Sim::new(SimConfig::new(*algorithm)).run(&workload()).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }

    #[test]
    fn config_is_kept_as_given() {
        let config = SimConfig::new(Algorithm::RoundRobin { quantum: 3 });
        assert_eq!(Sim::new(config).config(), &config);
    }

    #[test]
    fn trace_only_for_round_robin() {
        assert!(Sim::new(SimConfig::new(Algorithm::Fcfs)).trace(&workload()).is_none());
        let events = Sim::new(SimConfig::new(Algorithm::RoundRobin { quantum: 2 }))
            .trace(&workload())
            .unwrap()
            .unwrap();
        assert!(!events.is_empty());
    }

    #[test]
    fn bad_quantum_surfaces_from_run() {
        let err = Sim::new(SimConfig::new(Algorithm::RoundRobin { quantum: 0 }))
            .run(&workload())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
