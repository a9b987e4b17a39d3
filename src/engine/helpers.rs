use uuid::Uuid;

use crate::{db::StoreError, error::{internal_error, Error}};

/// Identifiers that are not UUIDs cannot name any stored document.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

pub fn store_failure(message: &'static str) -> impl FnOnce(StoreError) -> Error {
    move |err| {
        tracing::error!(error = %err, "store operation failed");
        internal_error(message)
    }
}
