use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{CourseLocation, Directory, UserRecord};
use crate::ids::EntityId;
use crate::utils::errors::AppError;

/// In-memory directory for tests and local development. Seed it with
/// [`add_user`](Self::add_user) and friends before handing it to the app.
#[derive(Default)]
pub struct MemoryDirectory {
    users: RwLock<Vec<UserRecord>>,
    branches: RwLock<HashMap<i64, EntityId>>,
    courses: RwLock<HashMap<i64, CourseLocation>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: UserRecord) {
        self.users.write().unwrap().push(user);
    }

    pub fn add_branch(&self, branch_id: EntityId, school_id: EntityId) {
        self.branches.write().unwrap().insert(branch_id.0, school_id);
    }

    pub fn add_course(
        &self,
        course_id: EntityId,
        school_id: EntityId,
        branch_id: Option<EntityId>,
    ) {
        self.courses.write().unwrap().insert(
            course_id.0,
            CourseLocation {
                school_id,
                branch_id,
            },
        );
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: EntityId) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn branch_school(&self, branch_id: EntityId) -> Result<Option<EntityId>, AppError> {
        Ok(self.branches.read().unwrap().get(&branch_id.0).copied())
    }

    async fn course_location(
        &self,
        course_id: EntityId,
    ) -> Result<Option<CourseLocation>, AppError> {
        Ok(self.courses.read().unwrap().get(&course_id.0).copied())
    }
}
