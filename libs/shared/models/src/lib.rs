pub mod error;
pub mod store;

pub use error::AppError;
pub use store::StoreError;
