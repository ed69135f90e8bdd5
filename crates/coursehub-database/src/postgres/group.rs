//! Group purchases.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupPurchaseId, UserId};
use coursehub_entity::group::{GroupMember, GroupPurchase, GroupStatus, JoinOutcome, MemberRole};
use coursehub_entity::ledger::{LineItem, Transaction};

use super::{
    commit, insert_event, insert_transaction, promote_to_students, upsert_enrollments,
    violated_unique, PgCommerceStore,
};
use crate::store::{FanoutReport, GroupInsert, GroupStore, JoinResult, Transition};

const INVITE_CODE_KEY: &str = "group_purchases_invite_code_key";
const ONE_OPEN_PER_CREATOR: &str = "group_purchases_one_open_per_creator";

async fn insert_member(conn: &mut sqlx::PgConnection, member: &GroupMember) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO group_members (id, group_purchase_id, user_id, role, joined_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(member.id)
    .bind(member.group_purchase_id)
    .bind(member.user_id)
    .bind(member.role)
    .bind(member.joined_at)
    .execute(conn)
    .await
    .map_err(|e| match violated_unique(&e) {
        Some("group_members_group_user_key") => AppError::conflict("Already a member of this group"),
        _ => AppError::with_source(ErrorKind::Database, "Failed to add group member", e),
    })?;
    Ok(())
}

#[async_trait]
impl GroupStore for PgCommerceStore {
    async fn find_open_group(
        &self,
        creator_id: UserId,
        course_id: CourseId,
    ) -> AppResult<Option<GroupPurchase>> {
        sqlx::query_as::<_, GroupPurchase>(
            "SELECT * FROM group_purchases WHERE creator_id = $1 AND course_id = $2 \
             AND status IN ('PENDING_PAYMENT', 'ACTIVE') LIMIT 1",
        )
        .bind(creator_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find open group", e))
    }

    async fn create_group_checkout(
        &self,
        group: &GroupPurchase,
        creator: &GroupMember,
        transaction: &Transaction,
        items: &[LineItem],
    ) -> AppResult<GroupInsert> {
        let mut tx = self.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO group_purchases (id, course_id, tier_id, creator_id, invite_code, status, \
             member_count, member_limit, group_price, cashback_total, cashback_per_member, \
             cashback_earned, cashback_released, completed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(group.id)
        .bind(group.course_id)
        .bind(group.tier_id)
        .bind(group.creator_id)
        .bind(&group.invite_code)
        .bind(group.status)
        .bind(group.member_count)
        .bind(group.member_limit)
        .bind(group.group_price)
        .bind(group.cashback_total)
        .bind(group.cashback_per_member)
        .bind(group.cashback_earned)
        .bind(group.cashback_released)
        .bind(group.completed_at)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            return match violated_unique(&e) {
                Some(INVITE_CODE_KEY) => {
                    debug!(invite_code = %group.invite_code, "Invite code collision");
                    Ok(GroupInsert::InviteCodeTaken)
                }
                Some(ONE_OPEN_PER_CREATOR) => Err(AppError::conflict(
                    "You already have an open group for this course",
                )),
                _ => Err(AppError::with_source(
                    ErrorKind::Database,
                    "Failed to create group purchase",
                    e,
                )),
            };
        }

        insert_member(&mut tx, creator).await?;
        insert_transaction(&mut tx, transaction, items).await?;
        insert_event(&mut tx, &group.created_event()).await?;
        commit(tx).await?;

        Ok(GroupInsert::Created(group.clone()))
    }

    async fn find_group_by_invite_code(
        &self,
        invite_code: &str,
    ) -> AppResult<Option<GroupPurchase>> {
        sqlx::query_as::<_, GroupPurchase>(
            "SELECT * FROM group_purchases WHERE invite_code = UPPER($1)",
        )
        .bind(invite_code.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group", e))
    }

    async fn group_members(&self, id: GroupPurchaseId) -> AppResult<Vec<GroupMember>> {
        sqlx::query_as::<_, GroupMember>(
            "SELECT * FROM group_members WHERE group_purchase_id = $1 \
             ORDER BY (role = 'CREATOR') DESC, joined_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list group members", e))
    }

    async fn activate_group(&self, id: GroupPurchaseId) -> AppResult<Transition<GroupPurchase>> {
        let mut tx = self.begin().await?;

        let mut group = sqlx::query_as::<_, GroupPurchase>(
            "SELECT * FROM group_purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock group", e))?
        .ok_or_else(|| AppError::not_found("Group not found"))?;

        if !group.activate() {
            return Ok(Transition::Unchanged(group));
        }

        sqlx::query("UPDATE group_purchases SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(group.id)
            .bind(group.status)
            .bind(group.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to activate group", e))?;
        insert_event(&mut tx, &group.activation_event()).await?;
        commit(tx).await?;

        Ok(Transition::Applied(group))
    }

    async fn join_group(&self, invite_code: &str, user_id: UserId) -> AppResult<JoinResult> {
        let mut tx = self.begin().await?;

        let mut group = sqlx::query_as::<_, GroupPurchase>(
            "SELECT * FROM group_purchases WHERE invite_code = UPPER($1) FOR UPDATE",
        )
        .bind(invite_code.trim())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock group", e))?
        .ok_or_else(|| AppError::not_found("Group not found"))?;

        let already_member: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM group_members WHERE group_purchase_id = $1 AND user_id = $2)",
        )
        .bind(group.id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check membership", e))?;

        let already_enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(group.course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check enrollment", e))?;

        let outcome = group.plan_join(user_id, already_member, already_enrolled, Utc::now())?;
        let JoinOutcome::Join(plan) = outcome else {
            return Ok(JoinResult { group, outcome });
        };

        insert_member(&mut tx, &GroupMember::new(group.id, user_id, MemberRole::Member)).await?;
        group.apply_join(&plan);

        sqlx::query(
            "UPDATE group_purchases SET member_count = $2, cashback_earned = $3, status = $4, \
             completed_at = $5, cashback_released = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(group.id)
        .bind(group.member_count)
        .bind(group.cashback_earned)
        .bind(group.status)
        .bind(group.completed_at)
        .bind(group.cashback_released)
        .bind(group.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update group", e))?;

        if GroupPurchase::releases_cashback(&plan, group.cashback_total) {
            let tutor_id: UserId =
                sqlx::query_scalar("SELECT tutor_id FROM courses WHERE id = $1")
                    .bind(group.course_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to load course tutor", e)
                    })?;

            for (wallet_owner, delta) in [
                (group.creator_id, group.cashback_total),
                (tutor_id, -group.cashback_total),
            ] {
                sqlx::query(
                    "UPDATE users SET wallet_balance = wallet_balance + $2, updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(wallet_owner)
                .bind(delta)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to move cashback", e)
                })?;
            }
            info!(
                group_id = %group.id,
                creator_id = %group.creator_id,
                tutor_id = %tutor_id,
                cashback = %group.cashback_total,
                "Cashback released"
            );
        }

        for event in group.join_events(user_id, &plan) {
            insert_event(&mut tx, &event).await?;
        }
        commit(tx).await?;

        Ok(JoinResult { group, outcome })
    }

    async fn complete_fanout(&self, id: GroupPurchaseId) -> AppResult<FanoutReport> {
        let mut tx = self.begin().await?;

        let group = sqlx::query_as::<_, GroupPurchase>(
            "SELECT * FROM group_purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock group", e))?
        .ok_or_else(|| AppError::not_found("Group not found"))?;

        if group.status != GroupStatus::Completed {
            return Err(AppError::validation(format!(
                "Group is {}, enrollment fan-out needs COMPLETED",
                group.status
            )));
        }

        let user_ids: Vec<UserId> = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_purchase_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list group members", e))?;

        let course_ids = vec![group.course_id; user_ids.len()];
        let enrollments_created =
            upsert_enrollments(&mut tx, &user_ids, &course_ids, Some(id), None).await?;
        let promoted = promote_to_students(&mut tx, &user_ids).await?;
        commit(tx).await?;

        Ok(FanoutReport {
            members: user_ids.len(),
            enrollments_created,
            promoted,
        })
    }
}
