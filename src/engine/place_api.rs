use super::helpers::{parse_id, store_failure};
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::PlaceAPI,
    db::{finish, StoreError},
    entities::{NewPlace, Place, PlaceWithCreator},
    error::{not_found_error, Error},
    images::remove_image,
};

const PLACE_NOT_FOUND: &str = "Could not find a place for the provided id.";
const USER_PLACES_NOT_FOUND: &str = "Could not find a place for the provided user id.";
const CREATOR_NOT_FOUND: &str = "Could not find user for provided id.";

const FIND_FAILED: &str = "Something went wrong, could not find a place.";
const FIND_BY_USER_FAILED: &str = "Fetching places failed, please try again later.";
const CREATE_FAILED: &str = "Creating place failed, please try again.";
const UPDATE_FAILED: &str = "Something went wrong, could not update place.";
const DELETE_FAILED: &str = "Something went wrong, could not delete place.";

#[async_trait]
impl PlaceAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_place(&self, id: &str) -> Result<Place, Error> {
        let place = match parse_id(id) {
            Some(id) => self
                .store
                .find_place(id)
                .await
                .map_err(store_failure(FIND_FAILED))?,
            None => None,
        };

        place.ok_or_else(|| not_found_error(PLACE_NOT_FOUND))
    }

    #[tracing::instrument(skip(self))]
    async fn find_places_by_user(&self, user_id: &str) -> Result<Vec<Place>, Error> {
        let user_with_places = match parse_id(user_id) {
            Some(id) => self
                .store
                .find_user_with_places(id)
                .await
                .map_err(store_failure(FIND_BY_USER_FAILED))?,
            None => None,
        };

        user_with_places
            .map(|found| found.places)
            .ok_or_else(|| not_found_error(USER_PLACES_NOT_FOUND))
    }

    #[tracing::instrument(skip(self))]
    async fn create_place(&self, params: NewPlace) -> Result<Place, Error> {
        let creator = match parse_id(&params.creator) {
            Some(id) => self
                .store
                .find_user(id)
                .await
                .map_err(store_failure(CREATE_FAILED))?,
            None => None,
        };

        let mut user = creator.ok_or_else(|| not_found_error(CREATOR_NOT_FOUND))?;

        let location = self.locate(&params.address).await?;
        let place = Place::new(params, user.id, location);

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(store_failure(CREATE_FAILED))?;

        let result: Result<(), StoreError> = async {
            tx.save_place(&place).await?;
            user.add_place(place.id);
            tx.save_user(&user).await
        }
        .await;

        finish(tx, result)
            .await
            .map_err(store_failure(CREATE_FAILED))?;

        tracing::info!(place_id = %place.id, creator = %user.id, "place created");

        Ok(place)
    }

    #[tracing::instrument(skip(self))]
    async fn update_place(
        &self,
        id: &str,
        title: String,
        description: String,
    ) -> Result<Place, Error> {
        let found = match parse_id(id) {
            Some(id) => self
                .store
                .find_place(id)
                .await
                .map_err(store_failure(UPDATE_FAILED))?,
            None => None,
        };

        let mut place = found.ok_or_else(|| not_found_error(PLACE_NOT_FOUND))?;

        place.title = title;
        place.description = description;

        self.store
            .save_place(&place)
            .await
            .map_err(store_failure(UPDATE_FAILED))?;

        Ok(place)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_place(&self, id: &str) -> Result<(), Error> {
        let found = match parse_id(id) {
            Some(id) => self
                .store
                .find_place_with_creator(id)
                .await
                .map_err(store_failure(DELETE_FAILED))?,
            None => None,
        };

        let PlaceWithCreator { place, creator } =
            found.ok_or_else(|| not_found_error("Place not found."))?;

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(store_failure(DELETE_FAILED))?;

        let result: Result<(), StoreError> = async {
            tx.delete_place(&place).await?;

            // a dangling creator reference has nothing to pull from
            if let Some(mut creator) = creator {
                creator.remove_place(&place.id);
                tx.save_user(&creator).await?;
            }

            Ok(())
        }
        .await;

        finish(tx, result)
            .await
            .map_err(store_failure(DELETE_FAILED))?;

        tracing::info!(place_id = %place.id, "place deleted");

        remove_image(&place.image).await;

        Ok(())
    }
}
