use std::collections::{BTreeSet, HashMap};

use sqlx::{PgPool, Postgres, Transaction};

use super::StoreError;
use crate::database::models::project::{Member, Project, ProjectStatus, ProjectWithMembers};

/// Partial patch for a project. When `user_ids` is present the membership
/// set is replaced wholesale, not merged; an empty list clears it.
#[derive(Debug, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub user_ids: Option<Vec<i32>>,
}

/// Store access and consistency rules for projects and their memberships.
pub struct ProjectService {
    pool: PgPool,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<ProjectWithMembers>, StoreError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, status FROM projects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        // One pass over the join table instead of a query per project
        let rows = sqlx::query_as::<_, (i32, i32, String)>(
            "SELECT pu.project_id, u.id, u.name \
             FROM project_users pu JOIN users u ON u.id = pu.user_id \
             ORDER BY pu.project_id, u.id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut members_by_project: HashMap<i32, Vec<Member>> = HashMap::new();
        for (project_id, id, name) in rows {
            members_by_project
                .entry(project_id)
                .or_default()
                .push(Member { id, name });
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let members = members_by_project.remove(&project.id).unwrap_or_default();
                ProjectWithMembers { project, members }
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<ProjectWithMembers, StoreError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, status FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Project with id {} not found", id)))?;

        let members = self.members(id).await?;
        Ok(ProjectWithMembers { project, members })
    }

    /// Create the project row and its initial membership rows. Both commit
    /// in one transaction so a failure never leaves a memberless project.
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        status: ProjectStatus,
        user_ids: &[i32],
    ) -> Result<ProjectWithMembers, StoreError> {
        let member_ids = self.check_users_exist(user_ids).await?;

        let mut tx = self.pool.begin().await?;
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (title, description, status) VALUES ($1, $2, $3) \
             RETURNING id, title, description, status",
        )
        .bind(title)
        .bind(description)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_memberships(&mut tx, project.id, &member_ids).await?;
        tx.commit().await?;

        let members = self.members(project.id).await?;
        Ok(ProjectWithMembers { project, members })
    }

    /// Apply a partial patch. A supplied member list replaces the whole
    /// membership set; memberships absent from the new list are removed.
    pub async fn update(&self, id: i32, patch: ProjectPatch) -> Result<ProjectWithMembers, StoreError> {
        let current = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, status FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Project with id {} does not exist", id)))?;

        let replacement = match &patch.user_ids {
            Some(ids) => Some(self.check_users_exist(ids).await?),
            None => None,
        };

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.unwrap_or(current.description);
        let status = patch.status.unwrap_or(current.status);

        let mut tx = self.pool.begin().await?;
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET title = $1, description = $2, status = $3 WHERE id = $4 \
             RETURNING id, title, description, status",
        )
        .bind(&title)
        .bind(&description)
        .bind(status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(member_ids) = replacement {
            sqlx::query("DELETE FROM project_users WHERE project_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_memberships(&mut tx, id, &member_ids).await?;
        }
        tx.commit().await?;

        let members = self.members(id).await?;
        Ok(ProjectWithMembers { project, members })
    }

    /// Delete the row and return its last-known data; membership rows go
    /// with it via ON DELETE CASCADE. Member users are untouched.
    pub async fn delete(&self, id: i32) -> Result<Project, StoreError> {
        sqlx::query_as::<_, Project>(
            "DELETE FROM projects WHERE id = $1 RETURNING id, title, description, status",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Project with id {} does not exist", id)))
    }

    async fn members(&self, project_id: i32) -> Result<Vec<Member>, StoreError> {
        let members = sqlx::query_as::<_, Member>(
            "SELECT u.id, u.name \
             FROM users u JOIN project_users pu ON pu.user_id = u.id \
             WHERE pu.project_id = $1 ORDER BY u.id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    // Exact-set check: every distinct requested id must resolve to a user.
    // Comparing counts alone would let a duplicated valid id mask a missing
    // one. Returns the deduplicated ids to link.
    async fn check_users_exist(&self, user_ids: &[i32]) -> Result<Vec<i32>, StoreError> {
        let distinct: BTreeSet<i32> = user_ids.iter().copied().collect();
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = distinct.iter().copied().collect();
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        if found.len() != ids.len() {
            let found: BTreeSet<i32> = found.into_iter().collect();
            let missing: Vec<String> = distinct
                .difference(&found)
                .map(|id| id.to_string())
                .collect();
            return Err(StoreError::NotFound(format!(
                "One or more userIds do not exist: {}",
                missing.join(", ")
            )));
        }
        Ok(ids)
    }

    async fn insert_memberships(
        tx: &mut Transaction<'_, Postgres>,
        project_id: i32,
        user_ids: &[i32],
    ) -> Result<(), StoreError> {
        for user_id in user_ids {
            sqlx::query(
                "INSERT INTO project_users (project_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT (project_id, user_id) DO NOTHING",
            )
            .bind(project_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
