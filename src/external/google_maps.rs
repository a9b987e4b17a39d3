use async_trait::async_trait;
use serde::Deserialize;

use super::{GeocodeError, Geocoder};
use crate::entities::Coordinates;

pub const DEFAULT_API_BASE: &str = "https://maps.googleapis.com";

#[derive(Clone, Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Clone, Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Clone, Debug, Deserialize)]
struct Response<T> {
    status: String,
    results: Option<T>,
}

/// Client for the Google Maps Geocoding API.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GoogleMaps {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn coordinates_for(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let url = format!(
            "{}/maps/api/geocode/json",
            self.api_base.trim_end_matches('/')
        );

        let res = self
            .client
            .get(url)
            .query(&[("address", address)])
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(GeocodeError::Rejected(status_code));
        } else if status_code != 200 {
            return Err(GeocodeError::Upstream(format!("http status {}", status_code)));
        }

        let data: Response<Vec<GeocodeResult>> = res.json().await?;

        first_coordinates(data)
    }
}

fn first_coordinates(data: Response<Vec<GeocodeResult>>) -> Result<Coordinates, GeocodeError> {
    match data.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(GeocodeError::NoResults),
        other => return Err(GeocodeError::Upstream(other.into())),
    }

    data.results
        .and_then(|results| results.into_iter().next())
        .map(|result| result.geometry.location)
        .ok_or(GeocodeError::NoResults)
}
