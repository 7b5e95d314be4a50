// User controller: validate -> load -> mutate -> respond.
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use super::field;
use crate::api::response::{ApiResponse, ApiResult};
use crate::database::manager::Db;
use crate::database::models::user::User;
use crate::error::ApiError;
use crate::services::{UserPatch, UserService};
use crate::validate;

/// GET /api/v1/users - list all users (empty list is a normal 200)
pub async fn list(State(db): State<Db>) -> ApiResult<Vec<User>> {
    let users = UserService::new(db.pool().clone()).list().await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// GET /api/v1/users/:id
pub async fn get(State(db): State<Db>, Path(id): Path<i32>) -> ApiResult<User> {
    let user = UserService::new(db.pool().clone()).get(id).await?;
    Ok(ApiResponse::ok("User fetched successfully", user))
}

/// POST /api/v1/users - body {name, email, age}
pub async fn create(State(db): State<Db>, Json(body): Json<Value>) -> ApiResult<User> {
    let name = validate::valid_string(body.get("name"), "Name", validate::MAX_STRING_LEN)
        .map_err(ApiError::invalid_input)?;
    let email =
        validate::valid_email(body.get("email"), "Email").map_err(ApiError::invalid_input)?;
    let age = age_field(body.get("age"))?;

    let user = UserService::new(db.pool().clone())
        .create(&name, &email, age)
        .await?;
    Ok(ApiResponse::created("User created successfully", user))
}

/// PUT /api/v1/users/:id - partial update; absent fields keep their value
pub async fn update(
    State(db): State<Db>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> ApiResult<User> {
    let mut patch = UserPatch::default();
    if let Some(v) = field(&body, "name") {
        patch.name = Some(
            validate::valid_string(Some(v), "Name", validate::MAX_STRING_LEN)
                .map_err(ApiError::invalid_input)?,
        );
    }
    if let Some(v) = field(&body, "email") {
        patch.email =
            Some(validate::valid_email(Some(v), "Email").map_err(ApiError::invalid_input)?);
    }
    if let Some(v) = field(&body, "age") {
        patch.age = Some(age_field(Some(v))?);
    }

    let user = UserService::new(db.pool().clone()).update(id, patch).await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}

/// DELETE /api/v1/users/:id - membership rows cascade with the user
pub async fn delete(State(db): State<Db>, Path(id): Path<i32>) -> ApiResult<()> {
    UserService::new(db.pool().clone()).delete(id).await?;
    Ok(ApiResponse::message("User deleted successfully"))
}

fn age_field(value: Option<&Value>) -> Result<i32, ApiError> {
    let age = validate::valid_number(value, "Age").map_err(ApiError::invalid_input)?;
    i32::try_from(age).map_err(|_| ApiError::invalid_input("Age must be a valid number."))
}
