pub mod model;
pub mod repository;

pub use model::ExecutionRecordDB;
pub use repository::ExecutionRecordRepository;
