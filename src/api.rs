use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{NewPlace, Place, User};
use crate::error::Error;

#[async_trait]
pub trait PlaceAPI {
    async fn find_place(&self, id: &str) -> Result<Place, Error>;

    async fn find_places_by_user(&self, user_id: &str) -> Result<Vec<Place>, Error>;

    async fn create_place(&self, params: NewPlace) -> Result<Place, Error>;

    async fn update_place(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Place, Error>;

    async fn delete_place(&self, id: &str) -> Result<(), Error>;
}

#[async_trait]
pub trait UserAPI {
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    async fn create_user(&self, name: String, email: String) -> Result<User, Error>;
}

pub trait API: PlaceAPI + UserAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
