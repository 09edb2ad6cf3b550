use rustc_hash::FxHashSet;

use super::{
    error::SchedError,
    state::{ProcessState, SchedState, Ticks},
};

const ENGINE: &str = "round-robin";

/// Checks the round-robin machine after every step.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last_now: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, core: &SchedState) -> Result<(), SchedError> {
        self.step += 1;

        if core.now < self.last_now {
            let id = core.running.unwrap_or_default();
            return Err(SchedError::invariant(
                ENGINE,
                id,
                format!("clock moved backwards from {} to {}", self.last_now, core.now),
            ));
        }
        self.last_now = core.now;

        if let Some(id) = core.running {
            let slot = core.slot(id);
            if slot.state != ProcessState::Running {
                return Err(SchedError::invariant(
                    ENGINE,
                    id,
                    format!("current process is {:?}, not Running", slot.state),
                ));
            }
        }

        let mut seen = FxHashSet::default();
        for &id in &core.ready {
            if !seen.insert(id) {
                return Err(SchedError::invariant(ENGINE, id, "queued twice"));
            }
            if core.running == Some(id) {
                return Err(SchedError::invariant(ENGINE, id, "running process still queued"));
            }
            let state = core.slot(id).state;
            if state != ProcessState::Ready {
                return Err(SchedError::invariant(
                    ENGINE,
                    id,
                    format!("{state:?} process present in ready queue"),
                ));
            }
        }

        for slot in &core.slots {
            if slot.remaining < 0 || slot.remaining > slot.burst {
                return Err(SchedError::invariant(
                    ENGINE,
                    slot.id,
                    format!("remaining burst {} outside 0..={}", slot.remaining, slot.burst),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_queue_entry_is_reported() {
        let mut core = SchedState::new(2, [(1, 0, 3), (2, 0, 3)]);
        core.admit_arrivals();
        core.ready.push_back(1);

        let err = Observer::new().observe(&core).unwrap_err();
        assert_eq!(err, SchedError::invariant(ENGINE, 1, "queued twice"));
    }

    #[test]
    fn fresh_state_is_consistent() {
        let mut core = SchedState::new(2, [(1, 0, 3), (2, 4, 1)]);
        core.admit_arrivals();
        let mut observer = Observer::new();
        observer.observe(&core).unwrap();
        assert_eq!(observer.steps(), 1);
    }
}
