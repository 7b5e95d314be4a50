pub mod project_service;
pub mod user_service;

pub use project_service::{ProjectPatch, ProjectService};
pub use user_service::{UserPatch, UserService};

use thiserror::Error;

/// Errors surfaced by the store-facing services. Handlers convert these to
/// `ApiError` at the boundary (404, 409, 500).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
