mod handlers;
mod middleware;
mod validation;

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use axum::{
    extract::Extension,
    handler::Handler,
    middleware::from_fn,
    routing::{get, get_service, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::DynAPI;
use crate::error::internal_error;
use crate::images::ImageStore;
use crate::server::handlers::{places, users};

pub fn router(api: DynAPI, images: ImageStore) -> Router {
    let uploads =
        get_service(ServeDir::new(images.dir())).handle_error(|err: io::Error| async move {
            tracing::error!(error = %err, "failed to serve upload");
            internal_error("Something went wrong, could not read the file.")
        });

    Router::new()
        .route("/api/places", post(places::create))
        .route("/api/places/user/:uid", get(places::find_by_user))
        .route(
            "/api/places/:pid",
            get(places::find)
                .patch(places::update)
                .delete(places::delete),
        )
        .route("/api/users", get(users::list))
        .route("/api/users/signup", post(users::signup))
        .nest("/uploads/images", uploads)
        .fallback(handlers::not_found.into_service())
        .layer(Extension(api))
        .layer(Extension(images))
        .layer(from_fn(middleware::handle_errors))
        .layer(from_fn(middleware::cors))
}

pub async fn serve<F>(
    api: DynAPI,
    images: ImageStore,
    port: u16,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let app = router(api, images);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::{Body, Bytes},
        http::{header, HeaderMap, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::{MemoryStore, Store};
    use crate::engine::Engine;
    use crate::entities::User;
    use crate::images::MAX_IMAGE_BYTES;

    const BOUNDARY: &str = "placeshare-test-boundary";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

    struct TestApp {
        router: Router,
        store: MemoryStore,
        user: User,
        uploads: TempDir,
    }

    impl TestApp {
        async fn new() -> Self {
            let store = MemoryStore::new();
            let user = User::new("Ann".into(), "ann@example.com".into());
            store.save_user(&user).await.unwrap();

            let uploads = tempfile::tempdir().unwrap();
            let api: DynAPI = Arc::new(Engine::new(Arc::new(store.clone()), None));
            let router = router(api, ImageStore::new(uploads.path()));

            Self {
                router,
                store,
                user,
                uploads,
            }
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
            let res = self.router.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let headers = res.headers().clone();
            let body = hyper::body::to_bytes(res.into_body()).await.unwrap();

            (status, headers, body)
        }

        async fn send_json(&self, req: Request<Body>) -> (StatusCode, Value) {
            let (status, _, body) = self.send(req).await;

            (status, serde_json::from_slice(&body).unwrap())
        }

        fn stored_uploads(&self) -> usize {
            std::fs::read_dir(self.uploads.path()).unwrap().count()
        }

        async fn create_place(
            &self,
            fields: &[(&str, &str)],
            image: Option<&[u8]>,
        ) -> (StatusCode, Value) {
            let (content_type, body) = multipart_body(fields, image);
            let req = Request::builder()
                .method(Method::POST)
                .uri("/api/places")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap();

            self.send_json(req).await
        }
    }

    fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> (String, Vec<u8>) {
        let mut body = Vec::new();

        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }

        if let Some(bytes) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n",
                    BOUNDARY
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        (format!("multipart/form-data; boundary={}", BOUNDARY), body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn empire_state(creator: &str) -> Vec<(&'static str, String)> {
        vec![
            ("title", "Empire State".into()),
            ("description", "A tall building".into()),
            ("address", "350 5th Ave, New York, NY".into()),
            ("creator", creator.into()),
        ]
    }

    fn borrowed<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
        fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    #[tokio::test]
    async fn preflight_is_answered_with_bare_ok() {
        let app = TestApp::new().await;
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/places/anything")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = app.send(req).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Origin, X-Requested-With, Content-Type, Accept, Authorization"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PATCH, DELETE"
        );
    }

    #[tokio::test]
    async fn unmatched_route_is_not_found() {
        let app = TestApp::new().await;

        let (status, headers, body) = app.send(get("/api/nowhere")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({ "message": "Could not find this route." })
        );
    }

    #[tokio::test]
    async fn unknown_place_and_user_are_not_found() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send_json(get(&format!("/api/places/{}", Uuid::new_v4())))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "message": "Could not find a place for the provided id." })
        );

        let (status, body) = app
            .send_json(get(&format!("/api/places/user/{}", Uuid::new_v4())))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "message": "Could not find a place for the provided user id." })
        );
    }

    #[tokio::test]
    async fn creates_place_end_to_end() {
        let app = TestApp::new().await;
        let fields = empire_state(&app.user.id.to_string());

        let (status, body) = app.create_place(&borrowed(&fields), Some(PNG)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["place"]["title"], "Empire State");
        assert_eq!(
            body["place"]["location"],
            json!({ "lat": 40.7484474, "lng": -73.9871516 })
        );
        assert_eq!(body["place"]["creator"], app.user.id.to_string());

        let (status, listed) = app
            .send_json(get(&format!("/api/places/user/{}", app.user.id)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["places"][0]["id"], body["place"]["id"]);

        let image = body["place"]["image"].as_str().unwrap();
        let file_name = Path::new(image).file_name().unwrap().to_str().unwrap();
        let (status, _, served) = app
            .send(get(&format!("/uploads/images/{}", file_name)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&served[..], PNG);
    }

    #[tokio::test]
    async fn failed_create_removes_the_upload() {
        let app = TestApp::new().await;
        let fields = empire_state(&Uuid::new_v4().to_string());

        let (status, body) = app.create_place(&borrowed(&fields), Some(PNG)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "message": "Could not find user for provided id." })
        );
        assert_eq!(app.stored_uploads(), 0);
        assert_eq!(app.store.place_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_create_is_rejected_and_cleaned_up() {
        let app = TestApp::new().await;
        let mut fields = empire_state(&app.user.id.to_string());
        fields[1].1 = "tall".into();

        let (status, body) = app.create_place(&borrowed(&fields), Some(PNG)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({ "message": "Invalid inputs passed, please check your data." })
        );
        assert_eq!(app.stored_uploads(), 0);

        let fields = empire_state(&app.user.id.to_string());
        let (status, _) = app.create_place(&borrowed(&fields), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(app.store.place_count().await, 0);
    }

    #[tokio::test]
    async fn create_without_multipart_body_is_invalid_input() {
        let app = TestApp::new().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/places")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "title": "x" }).to_string()))
            .unwrap();

        let (status, body) = app.send_json(req).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({ "message": "Invalid inputs passed, please check your data." })
        );
        assert_eq!(app.store.place_count().await, 0);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_and_not_stored() {
        let app = TestApp::new().await;
        let fields = empire_state(&app.user.id.to_string());
        let image = vec![0u8; MAX_IMAGE_BYTES + 1];

        let (status, body) = app.create_place(&borrowed(&fields), Some(&image)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "message": "Image exceeds the upload limit." }));
        assert_eq!(app.stored_uploads(), 0);
        assert_eq!(app.store.place_count().await, 0);
    }

    #[tokio::test]
    async fn empty_creator_is_not_found() {
        let app = TestApp::new().await;
        let fields = empire_state("");

        let (status, body) = app.create_place(&borrowed(&fields), Some(PNG)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "message": "Could not find user for provided id." })
        );
        assert_eq!(app.stored_uploads(), 0);
    }

    #[tokio::test]
    async fn updates_and_deletes_place() {
        let app = TestApp::new().await;
        let fields = empire_state(&app.user.id.to_string());
        let (_, created) = app.create_place(&borrowed(&fields), Some(PNG)).await;
        let uri = format!("/api/places/{}", created["place"]["id"].as_str().unwrap());

        let patch = |body: Value| {
            Request::builder()
                .method(Method::PATCH)
                .uri(&uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let (status, _) = app
            .send_json(patch(json!({ "title": "Chrysler", "description": "x" })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, updated) = app
            .send_json(patch(
                json!({ "title": "Chrysler", "description": "Art deco tower" }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["place"]["title"], "Chrysler");
        assert_eq!(updated["place"]["address"], created["place"]["address"]);
        assert_eq!(updated["place"]["image"], created["place"]["image"]);

        let req = Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send_json(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Deleted place." }));
        assert_eq!(app.stored_uploads(), 0);

        let (status, _) = app.send_json(get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = app
            .send_json(get(&format!("/api/places/user/{}", app.user.id)))
            .await;
        assert_eq!(listed, json!({ "places": [] }));
    }

    #[tokio::test]
    async fn signs_up_and_lists_users() {
        let app = TestApp::new().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/users/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "name": "Bo", "email": "bo@example.com" }).to_string(),
            ))
            .unwrap();

        let (status, body) = app.send_json(req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "bo@example.com");
        assert_eq!(body["user"]["places"], json!([]));

        let (status, body) = app.send_json(get("/api/users")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 2);
    }
}
