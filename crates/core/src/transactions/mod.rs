pub mod transactions_model;
pub mod transactions_service;
pub mod transactions_traits;

#[cfg(test)]
mod transactions_service_tests;

pub use transactions_model::{
    balance_effect, NewTransaction, RefundInput, Transaction, TransactionKind, TransactionUpdate,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
