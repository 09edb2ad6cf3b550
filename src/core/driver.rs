use super::{
    error::SchedError,
    event::SchedEvent,
    observer::Observer,
    state::{ProcessId, SchedState, Ticks},
};

/// Round-robin discrete-event machine over a single CPU.
pub struct SchedCore {
    pub state: SchedState,
    observer: Observer,
}

impl SchedCore {
    pub fn new(quantum: Ticks, processes: impl IntoIterator<Item = (ProcessId, Ticks, Ticks)>) -> Self {
        Self {
            state: SchedState::new(quantum, processes),
            observer: Observer::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state.all_completed()
    }

    /// Performs one transition batch: either a single idle tick, or one
    /// slice of at most `quantum` ticks for the process at the queue head.
    ///
    /// Arrivals are admitted after every tick, so a process arriving during
    /// a slice lands in the queue before the running process is preempted.
    pub fn step(&mut self) -> Result<Vec<SchedEvent>, SchedError> {
        let mut events = Vec::new();
        if self.is_done() {
            return Ok(events);
        }

        self.admit(&mut events);
        debug_assert!(self.state.cpu_is_idle(), "a slice outlived its step");

        match self.state.dispatch_next() {
            None => {
                events.push(SchedEvent::CpuIdle { at: self.state.now });
                self.state.advance_time(1);
            }
            Some(id) => {
                events.push(SchedEvent::Dispatched {
                    id,
                    at: self.state.now,
                });
                self.run_slice(id, &mut events);
            }
        }

        self.observer.observe(&self.state)?;
        Ok(events)
    }

    pub fn steps(&self) -> u64 {
        self.observer.steps()
    }

    fn run_slice(&mut self, id: ProcessId, events: &mut Vec<SchedEvent>) {
        let quantum = self.state.quantum;
        let mut consumed = 0;
        while consumed < quantum && self.state.slot(id).remaining > 0 {
            self.state.slot_mut(id).remaining -= 1;
            self.state.advance_time(1);
            consumed += 1;
            self.admit(events);
        }

        let at = self.state.now;
        let remaining = self.state.slot(id).remaining;
        if remaining == 0 {
            self.state.complete_running();
            events.push(SchedEvent::Completed { id, at });
        } else {
            self.state.preempt_running();
            events.push(SchedEvent::Preempted { id, at, remaining });
        }
    }

    fn admit(&mut self, events: &mut Vec<SchedEvent>) {
        let at = self.state.now;
        for id in self.state.admit_arrivals() {
            log::trace!("t={at} admitted P{id}");
            events.push(SchedEvent::Admitted { id, at });
        }
    }
}
