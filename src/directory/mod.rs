//! Tenant directory lookups.
//!
//! The [`Directory`] trait is the seam between the security pipeline and
//! storage: credential login, scope validation, and branch/course ownership
//! checks all go through it. Production uses [`postgres::PgDirectory`];
//! tests use [`memory::MemoryDirectory`] seeded in-process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::ids::EntityId;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;

/// A user row as the security pipeline sees it.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: EntityId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub school_id: Option<EntityId>,
}

/// Where a course lives: its school and, when assigned, its branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CourseLocation {
    pub school_id: EntityId,
    pub branch_id: Option<EntityId>,
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_id(&self, id: EntityId) -> Result<Option<UserRecord>, AppError>;

    /// The school a branch belongs to, or `None` for an unknown branch.
    async fn branch_school(&self, branch_id: EntityId) -> Result<Option<EntityId>, AppError>;

    /// The school (and branch, if any) a course belongs to, or `None` for an
    /// unknown course.
    async fn course_location(
        &self,
        course_id: EntityId,
    ) -> Result<Option<CourseLocation>, AppError>;
}
