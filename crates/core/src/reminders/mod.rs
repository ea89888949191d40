pub mod reminders_model;
pub mod reminders_service;
pub mod reminders_traits;

pub use reminders_model::{InvestmentReminder, NewInvestmentReminder, ReminderKind};
pub use reminders_service::ReminderService;
pub use reminders_traits::{InvestmentReminderRepositoryTrait, ReminderServiceTrait};
