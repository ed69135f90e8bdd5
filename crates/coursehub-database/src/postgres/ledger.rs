//! Transaction ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, TransactionId, UserId};
use coursehub_entity::ledger::{LineItem, Transaction, TransactionStatus};

use super::{
    commit, insert_event, insert_transaction, promote_to_students, upsert_enrollments,
    PgCommerceStore,
};
use crate::store::{FanoutReport, LedgerStore, Transition};

#[async_trait]
impl LedgerStore for PgCommerceStore {
    async fn record_checkout(
        &self,
        transaction: &Transaction,
        items: &[LineItem],
    ) -> AppResult<()> {
        let mut tx = self.begin().await?;
        insert_transaction(&mut tx, transaction, items).await?;
        commit(tx).await
    }

    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> AppResult<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE reference = $1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find transaction", e))
    }

    async fn line_items(&self, transaction_id: TransactionId) -> AppResult<Vec<LineItem>> {
        sqlx::query_as::<_, LineItem>(
            "SELECT * FROM transaction_line_items WHERE transaction_id = $1 ORDER BY course_id",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load line items", e))
    }

    async fn settle(
        &self,
        reference: &str,
        status: TransactionStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Transition<Transaction>> {
        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE reference = $1 FOR UPDATE",
        )
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock transaction", e))?
        .ok_or_else(|| AppError::not_found(format!("Transaction '{reference}' not found")))?;

        if current.status.is_terminal() || !status.is_terminal() {
            return Ok(Transition::Unchanged(current));
        }

        let settled = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET status = $2, paid_at = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(current.id)
        .bind(status)
        .bind(paid_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to settle transaction", e))?;

        if let Some(event) = settled.settlement_event() {
            insert_event(&mut tx, &event).await?;
        }
        commit(tx).await?;

        info!(reference = %reference, status = %settled.status, "Transaction settled");
        Ok(Transition::Applied(settled))
    }

    async fn grant_checkout_access(
        &self,
        transaction_id: TransactionId,
    ) -> AppResult<FanoutReport> {
        let mut tx = self.begin().await?;

        let buyer: Option<UserId> = sqlx::query_scalar(
            "SELECT user_id FROM transactions WHERE id = $1 AND status = 'SUCCESS'",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load transaction", e))?;
        let buyer = buyer.ok_or_else(|| {
            AppError::validation("Only successful transactions grant course access")
        })?;

        let course_ids: Vec<CourseId> = sqlx::query_scalar(
            "SELECT course_id FROM transaction_line_items WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load line items", e))?;

        let user_ids = vec![buyer; course_ids.len()];
        let enrollments_created =
            upsert_enrollments(&mut tx, &user_ids, &course_ids, None, Some(transaction_id)).await?;
        let promoted = promote_to_students(&mut tx, &[buyer]).await?;
        commit(tx).await?;

        Ok(FanoutReport {
            members: 1,
            enrollments_created,
            promoted,
        })
    }
}
