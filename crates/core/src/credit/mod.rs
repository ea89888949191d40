pub mod credit_model;
pub mod credit_service;
pub mod credit_traits;

#[cfg(test)]
mod credit_service_tests;

pub use credit_model::CreditCardStatus;
pub use credit_service::{days_until_due, is_overdue, CreditService};
pub use credit_traits::CreditServiceTrait;
