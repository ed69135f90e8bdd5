use async_trait::async_trait;

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupTierId, UserId};
use coursehub_entity::course::Course;
use coursehub_entity::group::GroupTier;
use coursehub_entity::user::User;

use super::MemoryCommerceStore;
use crate::store::CatalogStore;

#[async_trait]
impl CatalogStore for MemoryCommerceStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>> {
        Ok(self.state.read().await.courses.get(&id).cloned())
    }

    async fn find_courses(&self, ids: &[CourseId]) -> AppResult<Vec<Course>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.courses.get(id).cloned())
            .collect())
    }

    async fn find_tier(&self, id: GroupTierId) -> AppResult<Option<GroupTier>> {
        Ok(self.state.read().await.tiers.get(&id).cloned())
    }

    async fn enrolled_course_ids(
        &self,
        user_id: UserId,
        course_ids: &[CourseId],
    ) -> AppResult<Vec<CourseId>> {
        let state = self.state.read().await;
        Ok(course_ids
            .iter()
            .copied()
            .filter(|course_id| state.is_enrolled(user_id, *course_id))
            .collect())
    }
}
