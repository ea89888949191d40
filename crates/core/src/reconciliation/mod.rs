pub mod reconciliation_model;
pub mod reconciliation_service;
pub mod reconciliation_traits;

pub use reconciliation_model::{
    calculate_difference, classify_difference, BalanceAdjustment, DifferenceKind,
    NewBalanceAdjustment, ReconciliationPreview,
};
pub use reconciliation_service::ReconciliationService;
pub use reconciliation_traits::{BalanceAdjustmentRepositoryTrait, ReconciliationServiceTrait};
