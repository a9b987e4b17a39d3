pub mod places;
pub mod users;

use crate::error::{route_not_found_error, Error};

pub async fn not_found() -> Error {
    route_not_found_error()
}
