use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::api::{DynAPI, UserAPI};
use crate::entities::User;
use crate::error::{invalid_input_error, Error};
use crate::server::validation::validate_signup;

#[derive(Deserialize)]
pub struct SignupParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Serialize)]
pub struct UserBody {
    user: User,
}

#[derive(Serialize)]
pub struct UsersBody {
    users: Vec<User>,
}

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<UsersBody>, Error> {
    let users = api.list_users().await?;

    Ok(UsersBody { users }.into())
}

pub async fn signup(
    Extension(api): Extension<DynAPI>,
    params: Result<Json<SignupParams>, JsonRejection>,
) -> Result<(StatusCode, Json<UserBody>), Error> {
    let Json(params) = params.map_err(|_| invalid_input_error())?;
    validate_signup(&params.name, &params.email)?;

    let user = api
        .create_user(params.name.trim().into(), params.email.trim().into())
        .await?;

    Ok((StatusCode::CREATED, UserBody { user }.into()))
}
