mod engine;
pub mod runtime;

pub use engine::{should_arm, BreakScheduler, BreakTimer, SchedulerState};
pub use runtime::Reactor;
