mod helpers;
mod place_api;
mod user_api;

use std::sync::Arc;

use crate::{
    api::API,
    db::Store,
    entities::Coordinates,
    error::{internal_error, validation_error, Error},
    external::{GeocodeError, Geocoder},
};

/// Service context shared by every request.
pub struct Engine {
    store: Arc<dyn Store>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl Engine {
    /// Without a geocoder every new place gets [`Coordinates::placeholder`].
    pub fn new(store: Arc<dyn Store>, geocoder: Option<Arc<dyn Geocoder>>) -> Self {
        Self { store, geocoder }
    }

    #[tracing::instrument(name = "Engine::shutdown", skip_all)]
    pub async fn shutdown(&self) {
        self.store.close().await;
    }

    async fn locate(&self, address: &str) -> Result<Coordinates, Error> {
        let geocoder = match &self.geocoder {
            Some(geocoder) => geocoder,
            None => return Ok(Coordinates::placeholder()),
        };

        geocoder
            .coordinates_for(address)
            .await
            .map_err(|err| match err {
                GeocodeError::NoResults => {
                    validation_error("Could not find location for the specified address.")
                }
                err => {
                    tracing::error!(error = %err, "geocoding failed");
                    internal_error("Error fetching location data.")
                }
            })
    }
}

impl API for Engine {}
