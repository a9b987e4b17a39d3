use std::path::PathBuf;

use axum::{
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::Error, images::remove_image};

const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Authorization";
const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE";

/// Marks a response whose request stored an image that no place refers to.
#[derive(Clone, Debug)]
pub struct UploadedImage(pub PathBuf);

/// Error of a request that may have stored an image before failing.
#[derive(Debug)]
pub struct UploadFailure {
    pub error: Error,
    pub image: Option<PathBuf>,
}

impl IntoResponse for UploadFailure {
    fn into_response(self) -> Response {
        let mut res = self.error.into_response();

        if let Some(path) = self.image {
            res.extensions_mut().insert(UploadedImage(path));
        }

        res
    }
}

/// Sets the CORS headers on every response and answers preflight requests
/// without reaching the router.
pub async fn cors<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );

    res
}

/// Last stage before the CORS headers: removes uploads orphaned by a failed
/// request.
pub async fn handle_errors<B>(req: Request<B>, next: Next<B>) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut res = next.run(req).await;
    let status = res.status();
    let orphan = res.extensions_mut().remove::<UploadedImage>();

    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(%method, %uri, %status, "request failed");

        if let Some(UploadedImage(path)) = orphan {
            remove_image(path).await;
        }
    }

    res
}
