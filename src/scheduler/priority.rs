use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;

use super::{Algorithm, SchedulingEngine};
use crate::{
    core::{Priority, ProcessId, SchedError, Ticks},
    sim::{Process, ResultTable, Schedule, SimulationResult, Timeline, validate_workload},
};

/// The CPU becomes available one tick into the run, so the first dispatched
/// process starts at tick 1 and every later start carries the same offset.
///
/// Waiting time still counts from the process's arrival, so a process that
/// arrives at tick 0 and is dispatched first waits 1 tick.
pub const CPU_START: Ticks = 1;

/// Dispatch order: arrival time, then priority value, then process id.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct DispatchKey {
    pub arrival: Ticks,
    pub priority: Priority,
    pub id: ProcessId,
}

impl DispatchKey {
    fn of(p: &Process) -> Self {
        Self {
            arrival: p.arrival(),
            priority: p.priority(),
            id: p.id(),
        }
    }

    fn tuple(&self) -> (Ticks, Priority, ProcessId) {
        (self.arrival, self.priority, self.id)
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop DispatchKey's Ord
impl PartialOrd for DispatchKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DispatchKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other.tuple().cmp(&self.tuple())
    }
}

/// Non-preemptive priority scheduling. Lower priority values run first among
/// processes with the same arrival time.
pub struct PriorityScheduler;

impl PriorityScheduler {
    /// Ids in the order the engine dispatches them.
    pub fn dispatch_order(processes: &[Process]) -> Vec<ProcessId> {
        let mut queue = KeyedPriorityQueue::new();
        for p in processes {
            queue.push(p.id(), DispatchKey::of(p));
        }

        let mut order = Vec::with_capacity(processes.len());
        while let Some((id, _)) = queue.pop() {
            order.push(id);
        }
        order
    }
}

impl SchedulingEngine for PriorityScheduler {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Priority
    }

    fn schedule(&self, processes: &[Process]) -> Result<Schedule, SchedError> {
        validate_workload(processes)?;

        let by_id: FxHashMap<ProcessId, &Process> = processes.iter().map(|p| (p.id(), p)).collect();
        let mut timeline = Timeline::new();
        let mut rows = Vec::with_capacity(processes.len());

        timeline.push_idle(0, CPU_START);
        let mut cpu_free = CPU_START;

        for id in Self::dispatch_order(processes) {
            let p = by_id[&id];
            let start = cpu_free.max(p.arrival());
            timeline.push_idle(cpu_free, start);

            let completion = start + p.burst();
            timeline.push_run(id, start, completion);
            rows.push(SimulationResult::from_completion(p, start, completion));
            log::debug!(
                "priority: P{id} (prio {}) runs {start}..{completion}",
                p.priority()
            );

            cpu_free = completion;
        }

        Ok(Schedule {
            algorithm: self.algorithm(),
            table: ResultTable::new(self.algorithm().name(), rows)?,
            timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_fall_back_to_priority_then_id() {
        let processes = [
            Process::with_priority(1, 0, 2, 3),
            Process::with_priority(2, 0, 2, 1),
            Process::with_priority(3, 0, 2, 1),
            Process::with_priority(4, 1, 2, 0),
        ];
        assert_eq!(PriorityScheduler::dispatch_order(&processes), vec![2, 3, 1, 4]);
    }

    #[test]
    fn timeline_is_contiguous_from_tick_one() {
        let processes = [
            Process::with_priority(1, 0, 5, 2),
            Process::with_priority(2, 1, 3, 1),
            Process::with_priority(3, 2, 8, 3),
        ];
        let schedule = PriorityScheduler.schedule(&processes).unwrap();
        let starts: Vec<_> = schedule.table.iter().map(|r| r.start_time).collect();
        let waits: Vec<_> = schedule.table.iter().map(|r| r.waiting_time).collect();
        assert_eq!(starts, vec![1, 6, 9]);
        assert_eq!(waits, vec![1, 5, 7]);
        assert_eq!(schedule.table.get(3).unwrap().completion_time, 17);
    }

    #[test]
    fn start_offset_cannot_push_completion_out_of_range() {
        // Burst fills the tick range exactly once the one-tick offset is added
        let err = PriorityScheduler
            .schedule(&[Process::new(1, 0, Ticks::MAX)])
            .unwrap_err();
        assert!(matches!(err, SchedError::TimeOverflow { .. }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn reports_original_ids() {
        let processes = [
            Process::with_priority(7, 0, 1, 9),
            Process::with_priority(3, 0, 1, 0),
        ];
        let schedule = PriorityScheduler.schedule(&processes).unwrap();
        assert_eq!(schedule.timeline.gantt_sequence(), vec![3, 7]);
        assert_eq!(schedule.table.rows()[0].id, 3);
        assert_eq!(schedule.table.get(7).unwrap().start_time, 2);
    }
}
