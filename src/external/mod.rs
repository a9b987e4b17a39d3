pub mod google_maps;

pub use google_maps::GoogleMaps;

use async_trait::async_trait;

use crate::entities::Coordinates;

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no results for address")]
    NoResults,
    #[error("request rejected with status {0}")]
    Rejected(u16),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Resolves free-text addresses to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn coordinates_for(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}
