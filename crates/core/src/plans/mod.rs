pub mod plans_model;
pub mod plans_service;
pub mod plans_traits;
pub mod schedule;


pub use plans_model::{AutoInvestmentPlan, Frequency, NewPlan, PlanStatus, PlanUpdate};
pub use plans_service::PlanService;
pub use plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
pub use schedule::next_execution_date;
