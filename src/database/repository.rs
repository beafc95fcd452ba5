use async_trait::async_trait;

use crate::database::models::Entity;
use crate::database::StoreError;

/// CRUD contract shared by the primary database and the fallback document.
///
/// Methods are generic over the entity, so implementations are used through
/// static dispatch; `DataStore` decides which one is authoritative.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of `E`, ordered by id.
    async fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError>;

    /// Fails with `StoreError::Conflict` when the id is taken.
    async fn insert<E: Entity>(&self, record: E) -> Result<E, StoreError>;

    /// Fails with `StoreError::NotFound` when no record has `id`.
    async fn update<E: Entity>(&self, id: i64, patch: E::Patch) -> Result<E, StoreError>;

    async fn remove<E: Entity>(&self, id: i64) -> Result<(), StoreError>;
}
