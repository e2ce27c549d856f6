//! Escalation Scheduling
//!
//! Acknowledgement timers that re-inject timeout events, and a dispatcher
//! that feeds every event through the engine one at a time.

mod dispatcher;
mod timer;

pub use dispatcher::{
    DispatchError, DispatchRequest, DispatcherConfig, DispatcherHandle, EventDispatcher,
};
pub use timer::TokioTimerScheduler;
