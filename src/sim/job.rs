use rustc_hash::FxHashSet;

use crate::{
    core::{Priority, ProcessId, SchedError, Ticks},
    scheduler::priority::CPU_START,
};

/// One schedulable process. Immutable once built; engines only read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    arrival: Ticks,
    burst: Ticks,
    priority: Priority,
}

impl Process {
    pub fn new(id: ProcessId, arrival: Ticks, burst: Ticks) -> Self {
        Self::with_priority(id, arrival, burst, 0)
    }

    /// Lower `priority` values run first under the priority engine.
    pub fn with_priority(id: ProcessId, arrival: Ticks, burst: Ticks, priority: Priority) -> Self {
        Self {
            id,
            arrival,
            burst,
            priority,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn arrival(&self) -> Ticks {
        self.arrival
    }

    pub fn burst(&self) -> Ticks {
        self.burst
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// Rejects workloads no engine accepts. Runs before any computation, so an
/// error here means no partial result exists.
pub fn validate_workload(processes: &[Process]) -> Result<(), SchedError> {
    if processes.is_empty() {
        return Err(SchedError::EmptyWorkload);
    }

    let mut ids = FxHashSet::default();
    for p in processes {
        if p.id == 0 {
            return Err(SchedError::InvalidId { id: p.id });
        }
        if !ids.insert(p.id) {
            return Err(SchedError::DuplicateId { id: p.id });
        }
        if p.arrival < 0 {
            return Err(SchedError::NegativeArrival {
                id: p.id,
                arrival: p.arrival,
            });
        }
        if p.burst <= 0 {
            return Err(SchedError::NonPositiveBurst {
                id: p.id,
                burst: p.burst,
            });
        }
    }

    check_time_horizon(processes)
}

/// Every completion lies below `CPU_START + last arrival + total burst`, and
/// the per-table totals sum at most one such value per process. Both must
/// fit in `Ticks`.
fn check_time_horizon(processes: &[Process]) -> Result<(), SchedError> {
    let last_arrival = processes.iter().map(Process::arrival).max().unwrap_or(0);
    let total_burst = processes
        .iter()
        .try_fold(0 as Ticks, |acc, p| acc.checked_add(p.burst));
    let overflow = || SchedError::TimeOverflow {
        last_arrival,
        total_burst: total_burst.unwrap_or(Ticks::MAX),
        count: processes.len(),
    };

    let horizon = total_burst
        .and_then(|burst| burst.checked_add(last_arrival))
        .and_then(|end| end.checked_add(CPU_START))
        .ok_or_else(overflow)?;
    Ticks::try_from(processes.len())
        .ok()
        .and_then(|n| horizon.checked_mul(n))
        .ok_or_else(overflow)?;

    Ok(())
}

/// A validated, submission-ordered process set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    processes: Vec<Process>,
}

impl Workload {
    pub fn new(processes: Vec<Process>) -> Result<Self, SchedError> {
        validate_workload(&processes)?;
        Ok(Self { processes })
    }

    /// Builds a workload from parallel per-process columns, numbering the
    /// processes `1..=n` in column order. Without a priority column every
    /// process gets priority 0.
    pub fn from_columns(
        arrival: &[Ticks],
        burst: &[Ticks],
        priority: Option<&[Priority]>,
    ) -> Result<Self, SchedError> {
        let expected = arrival.len();
        if burst.len() != expected {
            return Err(SchedError::LengthMismatch {
                field: "burst",
                found: burst.len(),
                expected,
            });
        }
        if let Some(priority) = priority {
            if priority.len() != expected {
                return Err(SchedError::LengthMismatch {
                    field: "priority",
                    found: priority.len(),
                    expected,
                });
            }
        }

        let processes = (0..expected)
            .map(|i| {
                let prio = priority.map_or(0, |column| column[i]);
                Process::with_priority(i as ProcessId + 1, arrival[i], burst[i], prio)
            })
            .collect();

        Self::new(processes)
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn total_burst(&self) -> Ticks {
        self.processes.iter().map(Process::burst).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_numbered_from_one() {
        let workload = Workload::from_columns(&[0, 1, 2], &[5, 3, 8], Some(&[2, 1, 3])).unwrap();
        let ids: Vec<_> = workload.processes().iter().map(Process::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(workload.processes()[1].priority(), 1);
        assert_eq!(workload.total_burst(), 16);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = Workload::from_columns(&[0, 1], &[5], None).unwrap_err();
        assert_eq!(
            err,
            SchedError::LengthMismatch {
                field: "burst",
                found: 1,
                expected: 2
            }
        );

        let err = Workload::from_columns(&[0, 1], &[5, 2], Some(&[1])).unwrap_err();
        assert!(matches!(err, SchedError::LengthMismatch { field: "priority", .. }));
    }

    #[test]
    fn invalid_processes_are_rejected() {
        assert_eq!(Workload::new(vec![]).unwrap_err(), SchedError::EmptyWorkload);
        assert_eq!(
            Workload::new(vec![Process::new(1, 0, 0)]).unwrap_err(),
            SchedError::NonPositiveBurst { id: 1, burst: 0 }
        );
        assert_eq!(
            Workload::new(vec![Process::new(1, -1, 2)]).unwrap_err(),
            SchedError::NegativeArrival { id: 1, arrival: -1 }
        );
        assert_eq!(
            Workload::new(vec![Process::new(1, 0, 2), Process::new(1, 3, 2)]).unwrap_err(),
            SchedError::DuplicateId { id: 1 }
        );
        assert_eq!(
            Workload::new(vec![Process::new(0, 0, 2)]).unwrap_err(),
            SchedError::InvalidId { id: 0 }
        );
    }

    #[test]
    fn timeline_past_tick_range_is_rejected() {
        let err = Workload::new(vec![Process::new(1, Ticks::MAX, 1)]).unwrap_err();
        assert!(matches!(err, SchedError::TimeOverflow { count: 1, .. }));
        assert!(err.is_invalid_input());

        let err = Workload::new(vec![Process::new(1, 0, Ticks::MAX), Process::new(2, 0, Ticks::MAX)])
            .unwrap_err();
        assert!(matches!(
            err,
            SchedError::TimeOverflow {
                total_burst: Ticks::MAX,
                count: 2,
                ..
            }
        ));

        // Fits on its own, but the turnaround total over two processes does not
        let half = Ticks::MAX / 2;
        let err = Workload::new(vec![Process::new(1, 0, half), Process::new(2, 0, 1)]).unwrap_err();
        assert!(matches!(err, SchedError::TimeOverflow { count: 2, .. }));
    }

    #[test]
    fn largest_single_process_still_fits() {
        let burst = Ticks::MAX - CPU_START;
        assert!(Workload::new(vec![Process::new(1, 0, burst)]).is_ok());
    }
}
