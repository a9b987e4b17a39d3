mod location;
mod place;
mod user;

pub use location::Coordinates;
pub use place::{NewPlace, Place, PlaceWithCreator};
pub use user::{User, UserWithPlaces};
