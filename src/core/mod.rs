pub mod driver;
pub mod error;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::SchedCore;
pub use error::{ErrorKind, SchedError};
pub use event::SchedEvent;
pub use observer::Observer;
pub use state::{Priority, ProcessId, ProcessSlot, ProcessState, SchedState, Ticks};
