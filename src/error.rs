use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred!";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
    #[error("Could not find this route.")]
    RouteNotFound,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            UNKNOWN_ERROR_MESSAGE.into()
        } else {
            message
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": self.message(),
        }));

        (self.status_code(), body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error::Validation("Invalid inputs passed, please check your data.".into())
}

pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.into())
}

pub fn not_found_error(message: &str) -> Error {
    Error::NotFound(message.into())
}

pub fn internal_error(message: &str) -> Error {
    Error::Internal(message.into())
}

pub fn route_not_found_error() -> Error {
    Error::RouteNotFound
}
