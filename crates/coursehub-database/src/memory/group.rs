use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupPurchaseId, UserId};
use coursehub_entity::group::{GroupMember, GroupPurchase, GroupStatus, JoinOutcome, MemberRole};
use coursehub_entity::ledger::{LineItem, Transaction};

use super::{records, MemoryCommerceStore};
use crate::store::{FanoutReport, GroupInsert, GroupStore, JoinResult, Transition};

#[async_trait]
impl GroupStore for MemoryCommerceStore {
    async fn find_open_group(
        &self,
        creator_id: UserId,
        course_id: CourseId,
    ) -> AppResult<Option<GroupPurchase>> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .values()
            .find(|g| g.creator_id == creator_id && g.course_id == course_id && g.status.is_open())
            .cloned())
    }

    async fn create_group_checkout(
        &self,
        group: &GroupPurchase,
        creator: &GroupMember,
        transaction: &Transaction,
        items: &[LineItem],
    ) -> AppResult<GroupInsert> {
        let events = records(&[transaction.created_event(), group.created_event()])?;
        let mut state = self.state.write().await;

        if state.group_by_invite_code(&group.invite_code).is_some() {
            return Ok(GroupInsert::InviteCodeTaken);
        }
        let has_open = state.groups.values().any(|g| {
            g.creator_id == group.creator_id && g.course_id == group.course_id && g.status.is_open()
        });
        if has_open {
            return Err(AppError::conflict(
                "You already have an open group for this course",
            ));
        }
        state.check_transaction(transaction)?;

        state.groups.insert(group.id, group.clone());
        state.members.push(creator.clone());
        state.insert_transaction(transaction, items);
        state.push_events(events);
        Ok(GroupInsert::Created(group.clone()))
    }

    async fn find_group_by_invite_code(
        &self,
        invite_code: &str,
    ) -> AppResult<Option<GroupPurchase>> {
        let state = self.state.read().await;
        Ok(state
            .group_by_invite_code(invite_code)
            .and_then(|id| state.groups.get(&id).cloned()))
    }

    async fn group_members(&self, id: GroupPurchaseId) -> AppResult<Vec<GroupMember>> {
        let state = self.state.read().await;
        let mut members: Vec<GroupMember> = state
            .members
            .iter()
            .filter(|m| m.group_purchase_id == id)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.role != MemberRole::Creator, m.joined_at));
        Ok(members)
    }

    async fn activate_group(&self, id: GroupPurchaseId) -> AppResult<Transition<GroupPurchase>> {
        let mut state = self.state.write().await;
        let mut group = state
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Group not found"))?;

        if !group.activate() {
            return Ok(Transition::Unchanged(group));
        }
        let events = records(&[group.activation_event()])?;
        state.groups.insert(group.id, group.clone());
        state.push_events(events);
        Ok(Transition::Applied(group))
    }

    async fn join_group(&self, invite_code: &str, user_id: UserId) -> AppResult<JoinResult> {
        let mut state = self.state.write().await;
        let group_id = state
            .group_by_invite_code(invite_code)
            .ok_or_else(|| AppError::not_found("Group not found"))?;
        let mut group = state
            .groups
            .get(&group_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Group not found"))?;

        let already_member = state.is_member(group.id, user_id);
        let already_enrolled = state.is_enrolled(user_id, group.course_id);
        let outcome = group.plan_join(user_id, already_member, already_enrolled, Utc::now())?;
        let JoinOutcome::Join(plan) = outcome else {
            return Ok(JoinResult { group, outcome });
        };

        group.apply_join(&plan);
        let releases = GroupPurchase::releases_cashback(&plan, group.cashback_total);
        let tutor_id = if releases {
            let course = state
                .courses
                .get(&group.course_id)
                .ok_or_else(|| AppError::not_found("Course not found"))?;
            Some(course.tutor_id)
        } else {
            None
        };
        let events = records(&group.join_events(user_id, &plan))?;

        state
            .members
            .push(GroupMember::new(group.id, user_id, MemberRole::Member));
        if let Some(tutor_id) = tutor_id {
            for (owner, delta) in [
                (group.creator_id, group.cashback_total),
                (tutor_id, -group.cashback_total),
            ] {
                if let Some(user) = state.users.get_mut(&owner) {
                    user.wallet_balance += delta;
                    user.updated_at = Utc::now();
                }
            }
            info!(
                group_id = %group.id,
                creator_id = %group.creator_id,
                tutor_id = %tutor_id,
                cashback = %group.cashback_total,
                "Cashback released"
            );
        }
        state.groups.insert(group.id, group.clone());
        state.push_events(events);

        Ok(JoinResult { group, outcome })
    }

    async fn complete_fanout(&self, id: GroupPurchaseId) -> AppResult<FanoutReport> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Group not found"))?;
        if group.status != GroupStatus::Completed {
            return Err(AppError::validation(format!(
                "Group is {}, enrollment fan-out needs COMPLETED",
                group.status
            )));
        }

        let user_ids: Vec<UserId> = state
            .members
            .iter()
            .filter(|m| m.group_purchase_id == id)
            .map(|m| m.user_id)
            .collect();
        let pairs: Vec<_> = user_ids.iter().map(|u| (*u, group.course_id)).collect();
        let enrollments_created = state.upsert_enrollments(&pairs, Some(id), None);
        let promoted = state.promote_to_students(&user_ids);

        Ok(FanoutReport {
            members: user_ids.len(),
            enrollments_created,
            promoted,
        })
    }
}
