pub mod model;
pub mod repository;

pub use model::PositionValuationDB;
pub use repository::PositionValuationRepository;
