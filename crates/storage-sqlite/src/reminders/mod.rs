pub mod model;
pub mod repository;

pub use model::InvestmentReminderDB;
pub use repository::InvestmentReminderRepository;
