use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{CourseLocation, Directory, UserRecord};
use crate::ids::EntityId;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;

/// Directory backed by the platform database.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: sqlx::postgres::PgRow) -> Result<UserRecord, AppError> {
        let role_str: String = row.try_get("role").map_err(AppError::internal)?;
        let role: Role = serde_json::from_value(serde_json::Value::String(role_str.clone()))
            .map_err(|_| {
                AppError::internal(anyhow::anyhow!("unrecognized role in database: {role_str}"))
            })?;
        Ok(UserRecord {
            id: row.try_get("id").map_err(AppError::internal)?,
            email: row.try_get("email").map_err(AppError::internal)?,
            password_hash: row.try_get("password_hash").map_err(AppError::internal)?,
            role,
            school_id: row.try_get("school_id").map_err(AppError::internal)?,
        })
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, school_id FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_user_by_id(&self, id: EntityId) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, school_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn branch_school(&self, branch_id: EntityId) -> Result<Option<EntityId>, AppError> {
        let row = sqlx::query("SELECT school_id FROM branches WHERE id = $1")
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_get("school_id").map_err(AppError::internal))
            .transpose()
    }

    async fn course_location(
        &self,
        course_id: EntityId,
    ) -> Result<Option<CourseLocation>, AppError> {
        let row = sqlx::query("SELECT school_id, branch_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            Ok(CourseLocation {
                school_id: r.try_get("school_id").map_err(AppError::internal)?,
                branch_id: r.try_get("branch_id").map_err(AppError::internal)?,
            })
        })
        .transpose()
    }
}
