use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinates, User};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub location: Coordinates,
    pub image: String,
    pub creator: Uuid,
}

/// Validated input of the create operation. `creator` is kept as the raw
/// identifier sent by the client.
#[derive(Clone, Debug)]
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub address: String,
    pub creator: String,
    pub image: String,
}

/// A place read together with its creator. `creator` is `None` when the
/// reference no longer resolves.
#[derive(Clone, Debug)]
pub struct PlaceWithCreator {
    pub place: Place,
    pub creator: Option<User>,
}

impl Place {
    pub fn new(params: NewPlace, creator: Uuid, location: Coordinates) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            address: params.address,
            location,
            image: params.image,
            creator,
        }
    }
}
