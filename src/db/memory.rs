use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreTransaction};
use crate::entities::{Place, PlaceWithCreator, User, UserWithPlaces};

#[derive(Default)]
struct Collections {
    places: HashMap<Uuid, Place>,
    users: HashMap<Uuid, User>,
}

#[derive(Default)]
struct Inner {
    collections: RwLock<Collections>,
    fail_writes: AtomicBool,
}

impl Inner {
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }

        Ok(())
    }
}

/// In-process store. Clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every write fails with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn place_count(&self) -> usize {
        self.inner.collections.read().await.places.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
        Ok(self.inner.collections.read().await.places.get(&id).cloned())
    }

    async fn find_place_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<PlaceWithCreator>, StoreError> {
        let collections = self.inner.collections.read().await;

        Ok(collections.places.get(&id).map(|place| PlaceWithCreator {
            place: place.clone(),
            creator: collections.users.get(&place.creator).cloned(),
        }))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.collections.read().await.users.get(&id).cloned())
    }

    async fn find_user_with_places(
        &self,
        id: Uuid,
    ) -> Result<Option<UserWithPlaces>, StoreError> {
        let collections = self.inner.collections.read().await;

        Ok(collections.users.get(&id).map(|user| UserWithPlaces {
            user: user.clone(),
            places: user
                .places
                .iter()
                .filter_map(|place_id| collections.places.get(place_id).cloned())
                .collect(),
        }))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let collections = self.inner.collections.read().await;

        Ok(collections
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .inner
            .collections
            .read()
            .await
            .users
            .values()
            .cloned()
            .collect())
    }

    async fn save_place(&self, place: &Place) -> Result<(), StoreError> {
        self.inner.check_writable()?;
        self.inner
            .collections
            .write()
            .await
            .places
            .insert(place.id, place.clone());

        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.inner.check_writable()?;
        self.inner
            .collections
            .write()
            .await
            .users
            .insert(user.id, user.clone());

        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            inner: self.inner.clone(),
            writes: vec![],
        }))
    }

    async fn close(&self) {}
}

enum Write {
    SavePlace(Place),
    SaveUser(User),
    DeletePlace(Uuid),
}

/// Buffers writes and applies them under a single write guard on commit.
struct MemoryTransaction {
    inner: Arc<Inner>,
    writes: Vec<Write>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn save_place(&mut self, place: &Place) -> Result<(), StoreError> {
        self.inner.check_writable()?;
        self.writes.push(Write::SavePlace(place.clone()));

        Ok(())
    }

    async fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        self.inner.check_writable()?;
        self.writes.push(Write::SaveUser(user.clone()));

        Ok(())
    }

    async fn delete_place(&mut self, place: &Place) -> Result<(), StoreError> {
        self.inner.check_writable()?;
        self.writes.push(Write::DeletePlace(place.id));

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { inner, writes } = *self;
        inner.check_writable()?;

        let mut collections = inner.collections.write().await;
        for write in writes {
            match write {
                Write::SavePlace(place) => {
                    collections.places.insert(place.id, place);
                }
                Write::SaveUser(user) => {
                    collections.users.insert(user.id, user);
                }
                Write::DeletePlace(id) => {
                    collections.places.remove(&id);
                }
            }
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
