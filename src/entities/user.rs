use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Place;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub places: Vec<Uuid>,
}

#[derive(Clone, Debug)]
pub struct UserWithPlaces {
    pub user: User,
    pub places: Vec<Place>,
}

impl User {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            places: vec![],
        }
    }

    pub fn add_place(&mut self, place_id: Uuid) {
        self.places.push(place_id);
    }

    pub fn remove_place(&mut self, place_id: &Uuid) {
        self.places.retain(|id| id != place_id);
    }
}
