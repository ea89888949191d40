pub mod valuations_model;
pub mod valuations_traits;

pub use valuations_model::{NewPositionValuation, PositionValuation};
pub use valuations_traits::PositionValuationRepositoryTrait;
