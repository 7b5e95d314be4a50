// Project controller: validate -> load -> mutate -> respond.
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use super::field;
use crate::api::response::{ApiResponse, ApiResult};
use crate::database::manager::Db;
use crate::database::models::project::{Project, ProjectStatus, ProjectWithMembers};
use crate::error::ApiError;
use crate::services::{ProjectPatch, ProjectService};
use crate::validate;

const USER_IDS_REQUIRED: &str = "userIds is required and must be a non-empty array of integers.";

/// GET /api/v1/projects - all projects with members embedded
pub async fn list(State(db): State<Db>) -> ApiResult<Vec<ProjectWithMembers>> {
    let projects = ProjectService::new(db.pool().clone()).list().await?;
    Ok(ApiResponse::ok("Projects fetched successfully", projects))
}

/// GET /api/v1/projects/:id
pub async fn get(State(db): State<Db>, Path(id): Path<i32>) -> ApiResult<ProjectWithMembers> {
    let project = ProjectService::new(db.pool().clone()).get(id).await?;
    Ok(ApiResponse::ok("Project fetched successfully", project))
}

/// POST /api/v1/projects - body {title, description, status, userIds}
///
/// The member list is required and must be non-empty at creation time.
pub async fn create(State(db): State<Db>, Json(body): Json<Value>) -> ApiResult<ProjectWithMembers> {
    let title = validate::valid_string(body.get("title"), "Title", validate::MAX_STRING_LEN)
        .map_err(ApiError::invalid_input)?;
    let description = validate::valid_string(
        body.get("description"),
        "Description",
        validate::MAX_DESCRIPTION_LEN,
    )
    .map_err(ApiError::invalid_input)?;
    let status = status_field(body.get("status"))?;

    let user_ids = user_ids_field(body.get("userIds"))?;
    if user_ids.is_empty() {
        return Err(ApiError::invalid_input(USER_IDS_REQUIRED));
    }

    let project = ProjectService::new(db.pool().clone())
        .create(&title, &description, status, &user_ids)
        .await?;
    Ok(ApiResponse::created("Project created successfully", project))
}

/// PUT /api/v1/projects/:id - partial update
///
/// A supplied `userIds` list replaces the membership set wholesale; unlike
/// creation, an empty list is allowed here and clears all memberships.
pub async fn update(
    State(db): State<Db>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> ApiResult<ProjectWithMembers> {
    let mut patch = ProjectPatch::default();
    if let Some(v) = field(&body, "title") {
        patch.title = Some(
            validate::valid_string(Some(v), "Title", validate::MAX_STRING_LEN)
                .map_err(ApiError::invalid_input)?,
        );
    }
    if let Some(v) = field(&body, "description") {
        patch.description = Some(
            validate::valid_string(Some(v), "Description", validate::MAX_DESCRIPTION_LEN)
                .map_err(ApiError::invalid_input)?,
        );
    }
    if let Some(v) = field(&body, "status") {
        patch.status = Some(status_field(Some(v))?);
    }
    if let Some(v) = field(&body, "userIds") {
        patch.user_ids = Some(user_ids_field(Some(v))?);
    }

    let project = ProjectService::new(db.pool().clone()).update(id, patch).await?;
    Ok(ApiResponse::ok("Project updated successfully", project))
}

/// DELETE /api/v1/projects/:id - responds with the deleted row's data
pub async fn delete(State(db): State<Db>, Path(id): Path<i32>) -> ApiResult<Project> {
    let project = ProjectService::new(db.pool().clone()).delete(id).await?;
    Ok(ApiResponse::ok("Project deleted successfully", project))
}

fn status_field(value: Option<&Value>) -> Result<ProjectStatus, ApiError> {
    let raw = validate::valid_string(value, "Status", validate::MAX_STRING_LEN)
        .map_err(ApiError::invalid_input)?;
    ProjectStatus::parse(raw.trim())
        .ok_or_else(|| ApiError::invalid_input("Status must be one of: pending, in progress, completed"))
}

fn user_ids_field(value: Option<&Value>) -> Result<Vec<i32>, ApiError> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Err(ApiError::invalid_input(USER_IDS_REQUIRED)),
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = validate::valid_number(Some(item), "User ID").map_err(ApiError::invalid_input)?;
        let id = i32::try_from(id)
            .map_err(|_| ApiError::invalid_input("User ID must be a valid number."))?;
        ids.push(id);
    }
    Ok(ids)
}
