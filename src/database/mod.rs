pub mod error;
pub mod fallback;
pub mod manager;
pub mod models;
pub mod repository;
pub mod store;

pub use error::StoreError;
pub use fallback::{FallbackDocument, FallbackStore};
pub use manager::{DatabaseManager, SeedReport};
pub use repository::RecordStore;
pub use store::{DataStore, StoreMode};
