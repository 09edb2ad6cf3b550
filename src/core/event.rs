use crate::core::{ProcessId, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    // Not-yet-arrived -> ready
    Admitted {
        id: ProcessId,
        at: Ticks,
    },
    Dispatched {
        id: ProcessId,
        at: Ticks,
    },
    // Quantum expired with burst left; back to the queue tail
    Preempted {
        id: ProcessId,
        at: Ticks,
        remaining: Ticks,
    },
    Completed {
        id: ProcessId,
        at: Ticks,
    },
    // Nothing ready while unfinished work exists; one tick spent idle
    CpuIdle {
        at: Ticks,
    },
}

impl SchedEvent {
    pub fn at(&self) -> Ticks {
        match *self {
            Self::Admitted { at, .. }
            | Self::Dispatched { at, .. }
            | Self::Preempted { at, .. }
            | Self::Completed { at, .. }
            | Self::CpuIdle { at } => at,
        }
    }
}
