use sqlx::PgPool;

use super::StoreError;
use crate::database::models::user::User;

/// Partial patch for a user; absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

/// Store access and consistency rules for users.
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, age FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn get(&self, id: i32) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("SELECT id, name, email, age FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn create(&self, name: &str, email: &str, age: i32) -> Result<User, StoreError> {
        self.check_unique(name, email, None).await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, age) VALUES ($1, $2, $3) \
             RETURNING id, name, email, age",
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Apply a partial patch. Uniqueness is re-checked against all other
    /// rows with the effective (patched) name and email before writing.
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<User, StoreError> {
        let current = self.get(id).await?;

        let name = patch.name.unwrap_or(current.name);
        let email = patch.email.unwrap_or(current.email);
        let age = patch.age.unwrap_or(current.age);

        self.check_unique(&name, &email, Some(id)).await?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $1, email = $2, age = $3 WHERE id = $4 \
             RETURNING id, name, email, age",
        )
        .bind(&name)
        .bind(&email)
        .bind(age)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Delete the row; membership rows go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: i32) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "DELETE FROM users WHERE id = $1 RETURNING id, name, email, age",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("User with id {} not found", id)))
    }

    // Uniqueness rule: no two users share a name or an email address.
    // Email comparison is case-insensitive on create and update alike.
    async fn check_unique(
        &self,
        name: &str,
        email: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), StoreError> {
        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users \
             WHERE (name = $1 OR lower(email) = lower($2)) \
               AND ($3::INT4 IS NULL OR id <> $3)",
        )
        .bind(name)
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        if taken > 0 {
            return Err(StoreError::Conflict(
                "User name or email already exists".to_string(),
            ));
        }
        Ok(())
    }
}
