pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

pub use models::{Patient, Professional};
pub use store::{DirectoryStore, InMemoryDirectoryStore};
