use super::helpers::store_failure;
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::UserAPI,
    entities::User,
    error::{validation_error, Error},
};

const SIGNUP_FAILED: &str = "Signing up failed, please try again later.";

#[async_trait]
impl UserAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.store
            .list_users()
            .await
            .map_err(store_failure("Fetching users failed, please try again later."))
    }

    #[tracing::instrument(skip(self))]
    async fn create_user(&self, name: String, email: String) -> Result<User, Error> {
        let existing = self
            .store
            .find_user_by_email(&email)
            .await
            .map_err(store_failure(SIGNUP_FAILED))?;

        if existing.is_some() {
            return Err(validation_error("User exists already, please login instead."));
        }

        let user = User::new(name, email);

        self.store
            .save_user(&user)
            .await
            .map_err(store_failure(SIGNUP_FAILED))?;

        tracing::info!(user_id = %user.id, "user created");

        Ok(user)
    }
}
