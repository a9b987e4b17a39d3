use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Location assigned to new places when geocoding is disabled.
    pub const fn placeholder() -> Self {
        Self {
            lat: 40.7484474,
            lng: -73.9871516,
        }
    }
}
