pub mod model;
pub mod repository;

pub use model::AutoInvestmentPlanDB;
pub use repository::PlanRepository;
