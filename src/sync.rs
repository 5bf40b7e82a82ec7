//! Synchronization engine
//!
//! Scanner output flows into the planner, the planner's plan into the
//! executor; the pass controller drives one cycle and the scheduler drives
//! passes on a fixed interval.

pub mod cancel;
pub mod executor;
pub mod pass;
pub mod plan;
pub mod result;
pub mod scheduler;

pub use cancel::CancelToken;
pub use executor::Executor;
pub use pass::PassController;
pub use plan::{plan, CopyAction, CopyKind, PlanOptions, SyncPlan};
pub use result::PassResult;
pub use scheduler::{ScheduleConfig, ScheduleSummary, Scheduler};
