use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Project lifecycle status. Transitions are free-form: any value is
/// reachable from any other via update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status")]
pub enum ProjectStatus {
    #[serde(rename = "pending")]
    #[sqlx(rename = "pending")]
    Pending,
    #[serde(rename = "in progress")]
    #[sqlx(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    #[sqlx(rename = "completed")]
    Completed,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
}

/// A member user as embedded in project responses: id and name only,
/// membership metadata stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i32,
    pub name: String,
}

/// Project row with its member users embedded, the shape the API returns.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithMembers {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<Member>,
}
