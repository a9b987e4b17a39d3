//! Request validation performed before any service call.

use crate::error::{invalid_input_error, Error};

const MIN_DESCRIPTION_LENGTH: usize = 5;

/// Text fields of a create-place form.
#[derive(Clone, Debug, Default)]
pub struct PlaceForm {
    pub title: String,
    pub description: String,
    pub address: String,
    pub creator: String,
}

pub fn validate_new_place(form: &PlaceForm) -> Result<(), Error> {
    check(
        not_empty(&form.title)
            && min_length(&form.description, MIN_DESCRIPTION_LENGTH)
            && not_empty(&form.address),
    )
}

pub fn validate_place_update(title: &str, description: &str) -> Result<(), Error> {
    check(not_empty(title) && min_length(description, MIN_DESCRIPTION_LENGTH))
}

pub fn validate_signup(name: &str, email: &str) -> Result<(), Error> {
    check(not_empty(name) && is_email(email))
}

fn check(valid: bool) -> Result<(), Error> {
    if valid {
        Ok(())
    } else {
        tracing::debug!("request failed validation");
        Err(invalid_input_error())
    }
}

fn not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

fn min_length(value: &str, length: usize) -> bool {
    value.trim().chars().count() >= length
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
