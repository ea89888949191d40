pub mod executions_model;
pub mod executions_service;
pub mod executions_traits;


pub use executions_model::{
    ExecutionRecord, ExecutionStatus, NewExecutionRecord, OneTimeBuyInput, SweepSummary,
};
pub use executions_service::ExecutionEngine;
pub use executions_traits::{ExecutionEngineTrait, ExecutionRecordRepositoryTrait};
