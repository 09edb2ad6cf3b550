use rustc_hash::FxHashMap;
use std::collections::VecDeque;

// Signed so that a broken engine shows up as a negative time instead of wrapping
pub type Ticks = i64;
pub type ProcessId = u32;
pub type Priority = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotArrived,
    Ready,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct ProcessSlot {
    pub id: ProcessId,
    pub state: ProcessState,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub remaining: Ticks,
    pub first_dispatch: Option<Ticks>,
    pub exit_time: Option<Ticks>,
}

/// Working state of one round-robin run.
///
/// Slots are ordered by ascending process id, so scanning them in order
/// admits simultaneous arrivals in increasing id order.
#[derive(Debug)]
pub struct SchedState {
    pub now: Ticks,
    pub quantum: Ticks,
    pub slots: Vec<ProcessSlot>,
    pub ready: VecDeque<ProcessId>,
    pub running: Option<ProcessId>,
    id_to_slot: FxHashMap<ProcessId, usize>,

    // Decremented on every completion
    unfinished: usize,
}

impl SchedState {
    pub fn new(quantum: Ticks, processes: impl IntoIterator<Item = (ProcessId, Ticks, Ticks)>) -> Self {
        let mut slots: Vec<ProcessSlot> = processes
            .into_iter()
            .map(|(id, arrival, burst)| ProcessSlot {
                id,
                state: ProcessState::NotArrived,
                arrival,
                burst,
                remaining: burst,
                first_dispatch: None,
                exit_time: None,
            })
            .collect();
        slots.sort_by_key(|slot| slot.id);

        let id_to_slot = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (slot.id, index))
            .collect();
        let unfinished = slots.len();

        Self {
            now: 0,
            quantum,
            slots,
            ready: VecDeque::with_capacity(unfinished),
            running: None,
            id_to_slot,
            unfinished,
        }
    }

    pub fn slot(&self, id: ProcessId) -> &ProcessSlot {
        &self.slots[self.id_to_slot[&id]]
    }

    pub fn slot_mut(&mut self, id: ProcessId) -> &mut ProcessSlot {
        let index = self.id_to_slot[&id];
        &mut self.slots[index]
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn all_completed(&self) -> bool {
        self.unfinished == 0
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.running.is_none()
    }

    /// Moves every process whose arrival time has been reached into the
    /// ready queue and returns the admitted ids.
    pub fn admit_arrivals(&mut self) -> Vec<ProcessId> {
        let now = self.now;
        let mut admitted = Vec::new();
        for slot in &mut self.slots {
            if slot.state == ProcessState::NotArrived && slot.arrival <= now {
                slot.state = ProcessState::Ready;
                admitted.push(slot.id);
            }
        }
        self.ready.extend(admitted.iter().copied());
        admitted
    }

    pub fn dispatch_next(&mut self) -> Option<ProcessId> {
        debug_assert!(self.cpu_is_idle(), "CPU already running a process");

        let id = self.ready.pop_front()?;
        let now = self.now;
        let slot = self.slot_mut(id);
        debug_assert_eq!(
            slot.state,
            ProcessState::Ready,
            "Process {id} dispatched while not Ready"
        );
        slot.state = ProcessState::Running;
        slot.first_dispatch.get_or_insert(now);
        self.running = Some(id);
        Some(id)
    }

    pub fn preempt_running(&mut self) -> Option<ProcessId> {
        let id = self.running.take()?;
        self.slot_mut(id).state = ProcessState::Ready;
        self.ready.push_back(id);
        Some(id)
    }

    pub fn complete_running(&mut self) -> Option<ProcessId> {
        let id = self.running.take()?;
        let now = self.now;
        let slot = self.slot_mut(id);
        debug_assert_eq!(slot.remaining, 0, "Process {id} completed with work left");
        slot.state = ProcessState::Completed;
        slot.exit_time = Some(now);
        self.unfinished -= 1;
        Some(id)
    }
}
