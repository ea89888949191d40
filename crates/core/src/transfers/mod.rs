pub mod transfers_model;
pub mod transfers_service;
pub mod transfers_traits;


pub use transfers_model::{
    RepaymentRequest, SellOutcome, SellRequest, TransferOutcome, TransferRequest,
};
pub use transfers_service::TransferExecutor;
pub use transfers_traits::TransferExecutorTrait;
