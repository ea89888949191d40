pub mod plan_scheduler;

pub use plan_scheduler::PlanScheduler;
