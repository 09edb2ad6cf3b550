use super::{Algorithm, SchedulingEngine};
use crate::{
    core::{SchedCore, SchedError, SchedEvent, Ticks},
    sim::{Process, ResultTable, Schedule, SimulationResult, Timeline, validate_workload},
};

/// Preemptive round-robin with a fixed quantum.
///
/// Processes enter a FIFO ready queue when the clock reaches their arrival
/// time, run for at most one quantum, and go back to the tail if work
/// remains. The CPU idles one tick at a time while nothing is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin {
    quantum: Ticks,
}

impl RoundRobin {
    pub fn new(quantum: Ticks) -> Result<Self, SchedError> {
        if quantum <= 0 {
            return Err(SchedError::NonPositiveQuantum { quantum });
        }
        Ok(Self { quantum })
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }

    /// Every transition of the machine, in simulated-time order.
    pub fn trace(&self, processes: &[Process]) -> Result<Vec<SchedEvent>, SchedError> {
        self.run(processes).map(|(_, events)| events)
    }

    fn run(&self, processes: &[Process]) -> Result<(SchedCore, Vec<SchedEvent>), SchedError> {
        validate_workload(processes)?;

        let mut core = SchedCore::new(
            self.quantum(),
            processes.iter().map(|p| (p.id(), p.arrival(), p.burst())),
        );

        // Every step either idles one tick before the last arrival or
        // consumes at least one tick of burst.
        let last_arrival = processes.iter().map(Process::arrival).max().unwrap_or(0);
        let total_burst: Ticks = processes.iter().map(Process::burst).sum();
        let step_limit = (last_arrival + total_burst) as u64 + 1;

        let mut events = Vec::new();
        while !core.is_done() {
            if core.steps() >= step_limit {
                let id = core.state.running.or(core.state.ready.front().copied());
                return Err(SchedError::invariant(
                    self.algorithm().name(),
                    id.unwrap_or_default(),
                    format!("no progress after {step_limit} steps"),
                ));
            }
            let step = core.step()?;
            for event in &step {
                log::trace!("round-robin: {event:?}");
            }
            events.extend(step);
        }

        log::debug!(
            "round-robin: q={} finished at t={} after {} steps",
            self.quantum(),
            core.state.now,
            core.steps()
        );
        Ok((core, events))
    }
}

fn build_timeline(events: &[SchedEvent]) -> Timeline {
    let mut timeline = Timeline::new();
    let mut current = None;
    for event in events {
        match *event {
            SchedEvent::Dispatched { id, at } => current = Some((id, at)),
            SchedEvent::Preempted { id, at, .. } | SchedEvent::Completed { id, at } => {
                if let Some((running, start)) = current.take() {
                    debug_assert_eq!(running, id, "slice ended for a process that was not running");
                    timeline.push_run(id, start, at);
                }
            }
            SchedEvent::CpuIdle { at } => timeline.push_idle(at, at + 1),
            SchedEvent::Admitted { .. } => {}
        }
    }
    timeline
}

impl SchedulingEngine for RoundRobin {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RoundRobin {
            quantum: self.quantum(),
        }
    }

    fn schedule(&self, processes: &[Process]) -> Result<Schedule, SchedError> {
        let (core, events) = self.run(processes)?;
        let name = self.algorithm().name();

        let mut rows = Vec::with_capacity(processes.len());
        for p in processes {
            let slot = core.state.slot(p.id());
            let (Some(start), Some(exit)) = (slot.first_dispatch, slot.exit_time) else {
                return Err(SchedError::invariant(name, p.id(), "never completed"));
            };
            rows.push(SimulationResult::from_completion(p, start, exit));
        }

        Ok(Schedule {
            algorithm: self.algorithm(),
            table: ResultTable::new(name, rows)?,
            timeline: build_timeline(&events),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preempted_process_returns_to_tail() {
        let rr = RoundRobin::new(2).unwrap();
        let processes = [Process::new(1, 0, 5), Process::new(2, 1, 3)];
        let schedule = rr.schedule(&processes).unwrap();

        assert_eq!(schedule.timeline.gantt_sequence(), vec![1, 2, 1, 2, 1]);
        let p1 = schedule.table.get(1).unwrap();
        let p2 = schedule.table.get(2).unwrap();
        assert_eq!((p1.completion_time, p1.turnaround_time, p1.waiting_time), (8, 8, 3));
        assert_eq!((p2.completion_time, p2.turnaround_time, p2.waiting_time), (7, 6, 3));
        assert_eq!(p2.start_time, 2);
    }

    #[test]
    fn lone_process_runs_back_to_back_slices() {
        let rr = RoundRobin::new(1).unwrap();
        let schedule = rr.schedule(&[Process::new(1, 0, 3)]).unwrap();
        assert_eq!(schedule.timeline.gantt_sequence(), vec![1, 1, 1]);
        assert_eq!(schedule.table.get(1).unwrap().waiting_time, 0);
    }

    #[test]
    fn idle_gap_between_processes() {
        let rr = RoundRobin::new(3).unwrap();
        let processes = [Process::new(1, 1, 2), Process::new(2, 6, 2)];
        let schedule = rr.schedule(&processes).unwrap();
        // Idle 0..1 before P1, then 3..6 before P2
        assert_eq!(schedule.timeline.idle_time(), 4);
        assert_eq!(schedule.table.get(2).unwrap().completion_time, 8);
        assert_eq!(schedule.table.get(2).unwrap().waiting_time, 0);
    }

    #[test]
    fn unsorted_submission_is_admitted_by_arrival() {
        let rr = RoundRobin::new(2).unwrap();
        let processes = [Process::new(1, 4, 1), Process::new(2, 0, 2)];
        let schedule = rr.schedule(&processes).unwrap();
        assert_eq!(schedule.timeline.gantt_sequence(), vec![2, 1]);
        assert_eq!(schedule.table.get(1).unwrap().completion_time, 5);
    }

    #[test]
    fn non_positive_quantum_is_invalid_input() {
        assert_eq!(
            RoundRobin::new(0).unwrap_err(),
            SchedError::NonPositiveQuantum { quantum: 0 }
        );
        assert!(RoundRobin::new(-3).unwrap_err().is_invalid_input());
        assert_eq!(RoundRobin::new(5).unwrap().quantum(), 5);
    }

    #[test]
    fn overflowing_workload_is_rejected_before_running() {
        let rr = RoundRobin::new(3).unwrap();
        let processes = [Process::new(1, 0, Ticks::MAX), Process::new(2, 0, Ticks::MAX)];
        assert!(matches!(
            rr.schedule(&processes).unwrap_err(),
            SchedError::TimeOverflow { .. }
        ));
        assert!(rr.trace(&processes).unwrap_err().is_invalid_input());
    }

    #[test]
    fn trace_ends_with_last_completion() {
        let rr = RoundRobin::new(2).unwrap();
        let events = rr.trace(&[Process::new(1, 0, 3)]).unwrap();
        assert_eq!(events.last(), Some(&SchedEvent::Completed { id: 1, at: 3 }));
    }
}
