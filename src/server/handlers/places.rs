use std::path::PathBuf;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Extension, Json, Multipart, Path,
    },
    http::StatusCode,
};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};

use crate::api::{DynAPI, PlaceAPI};
use crate::entities::{NewPlace, Place};
use crate::error::{internal_error, invalid_input_error, validation_error, Error};
use crate::images::{check_content_type, check_size, remove_image, ImageError, ImageStore};
use crate::server::middleware::UploadFailure;
use crate::server::validation::{validate_new_place, validate_place_update, PlaceForm};

#[derive(Deserialize)]
pub struct UpdateParams {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Serialize)]
pub struct PlaceBody {
    place: Place,
}

#[derive(Serialize)]
pub struct PlacesBody {
    places: Vec<Place>,
}

#[derive(Serialize)]
pub struct MessageBody {
    message: &'static str,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(pid): Path<String>,
) -> Result<Json<PlaceBody>, Error> {
    let place = api.find_place(&pid).await?;

    Ok(PlaceBody { place }.into())
}

pub async fn find_by_user(
    Extension(api): Extension<DynAPI>,
    Path(uid): Path<String>,
) -> Result<Json<PlacesBody>, Error> {
    let places = api.find_places_by_user(&uid).await?;

    Ok(PlacesBody { places }.into())
}

#[debug_handler]
pub async fn create(
    Extension(api): Extension<DynAPI>,
    Extension(images): Extension<ImageStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<PlaceBody>), UploadFailure> {
    let mut multipart = multipart.map_err(|err| {
        tracing::debug!(error = %err, "create place without a multipart body");
        UploadFailure {
            error: invalid_input_error(),
            image: None,
        }
    })?;
    let mut image = None;

    match create_from_form(&api, &images, &mut multipart, &mut image).await {
        Ok(place) => Ok((StatusCode::CREATED, PlaceBody { place }.into())),
        Err(error) => Err(UploadFailure { error, image }),
    }
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Path(pid): Path<String>,
    params: Result<Json<UpdateParams>, JsonRejection>,
) -> Result<Json<PlaceBody>, Error> {
    let Json(params) = params.map_err(|_| invalid_input_error())?;
    validate_place_update(&params.title, &params.description)?;

    let place = api
        .update_place(&pid, params.title, params.description)
        .await?;

    Ok(PlaceBody { place }.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Path(pid): Path<String>,
) -> Result<Json<MessageBody>, Error> {
    api.delete_place(&pid).await?;

    Ok(MessageBody {
        message: "Deleted place.",
    }
    .into())
}

/// `image` is filled as soon as the upload is stored so the caller can
/// report it even when a later step fails.
async fn create_from_form(
    api: &DynAPI,
    images: &ImageStore,
    multipart: &mut Multipart,
    image: &mut Option<PathBuf>,
) -> Result<Place, Error> {
    let form = read_form(multipart, images, image).await?;
    validate_new_place(&form)?;

    let path = image.as_ref().ok_or_else(invalid_input_error)?;

    api.create_place(NewPlace {
        title: form.title,
        description: form.description,
        address: form.address,
        creator: form.creator,
        image: path.to_string_lossy().into_owned(),
    })
    .await
}

async fn read_form(
    multipart: &mut Multipart,
    images: &ImageStore,
    image: &mut Option<PathBuf>,
) -> Result<PlaceForm, Error> {
    let mut form = PlaceForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "image" {
            let content_type = field.content_type().map(str::to_owned);
            check_content_type(content_type.as_deref()).map_err(rejected_image)?;
            let bytes = read_image(field).await?;
            let path = images
                .save(content_type.as_deref(), &bytes)
                .await
                .map_err(rejected_image)?;

            if let Some(previous) = image.replace(path) {
                remove_image(previous).await;
            }
            continue;
        }

        let value = field.text().await.map_err(malformed)?;
        match name.as_str() {
            "title" => form.title = value,
            "description" => form.description = value,
            "address" => form.address = value,
            "creator" => form.creator = value,
            _ => {}
        }
    }

    Ok(form)
}

/// Reads an image field chunk by chunk, giving up once it passes the
/// upload limit.
async fn read_image(mut field: Field<'_>) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        check_size(bytes.len() + chunk.len()).map_err(rejected_image)?;
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn malformed(err: MultipartError) -> Error {
    tracing::debug!(error = %err, "malformed multipart body");
    invalid_input_error()
}

fn rejected_image(err: ImageError) -> Error {
    match err {
        ImageError::UnsupportedType(_) => validation_error("Invalid mime type!"),
        ImageError::TooLarge(_) => validation_error("Image exceeds the upload limit."),
        ImageError::Io(err) => {
            tracing::error!(error = %err, "failed to store image");
            internal_error("Storing the uploaded image failed, please try again.")
        }
    }
}
