//! Catalog reads.

use async_trait::async_trait;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupTierId, UserId};
use coursehub_entity::course::Course;
use coursehub_entity::group::GroupTier;
use coursehub_entity::user::User;

use super::PgCommerceStore;
use crate::store::CatalogStore;

#[async_trait]
impl CatalogStore for PgCommerceStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find course", e))
    }

    async fn find_courses(&self, ids: &[CourseId]) -> AppResult<Vec<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load courses", e))
    }

    async fn find_tier(&self, id: GroupTierId) -> AppResult<Option<GroupTier>> {
        sqlx::query_as::<_, GroupTier>("SELECT * FROM group_tiers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group tier", e))
    }

    async fn enrolled_course_ids(
        &self,
        user_id: UserId,
        course_ids: &[CourseId],
    ) -> AppResult<Vec<CourseId>> {
        sqlx::query_scalar::<_, CourseId>(
            "SELECT course_id FROM enrollments WHERE user_id = $1 AND course_id = ANY($2)",
        )
        .bind(user_id)
        .bind(course_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load enrollments", e))
    }
}
