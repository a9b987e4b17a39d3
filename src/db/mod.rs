//! Document store used by the engine.
//!
//! Each collection (`places`, `users`) holds whole documents keyed by UUID.
//! Multi-document writes go through a [`StoreTransaction`]: nothing written
//! through it is visible to readers until [`StoreTransaction::commit`]
//! succeeds, and dropping or rolling back a transaction discards every write.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Place, PlaceWithCreator, User, UserWithPlaces};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable")]
    Unavailable,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError>;

    async fn find_place_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<PlaceWithCreator>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Places are returned in the order of the user's list. References to
    /// places that no longer exist are skipped.
    async fn find_user_with_places(&self, id: Uuid)
        -> Result<Option<UserWithPlaces>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn save_place(&self, place: &Place) -> Result<(), StoreError>;

    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;

    async fn close(&self);
}

#[async_trait]
pub trait StoreTransaction: Send {
    async fn save_place(&mut self, place: &Place) -> Result<(), StoreError>;

    async fn save_user(&mut self, user: &User) -> Result<(), StoreError>;

    async fn delete_place(&mut self, place: &Place) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Commits `tx` when `result` is ok, otherwise rolls it back and returns the
/// original error.
pub async fn finish(
    tx: Box<dyn StoreTransaction>,
    result: Result<(), StoreError>,
) -> Result<(), StoreError> {
    match result {
        Ok(()) => tx.commit().await,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
