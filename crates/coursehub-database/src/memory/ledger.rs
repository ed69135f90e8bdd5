use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::TransactionId;
use coursehub_entity::ledger::{LineItem, Transaction, TransactionStatus};

use super::{records, MemoryCommerceStore};
use crate::store::{FanoutReport, LedgerStore, Transition};

#[async_trait]
impl LedgerStore for MemoryCommerceStore {
    async fn record_checkout(
        &self,
        transaction: &Transaction,
        items: &[LineItem],
    ) -> AppResult<()> {
        let events = records(&[transaction.created_event()])?;
        let mut state = self.state.write().await;
        state.check_transaction(transaction)?;
        state.insert_transaction(transaction, items);
        state.push_events(events);
        Ok(())
    }

    async fn find_transaction_by_reference(
        &self,
        reference: &str,
    ) -> AppResult<Option<Transaction>> {
        Ok(self
            .state
            .read()
            .await
            .transaction_by_reference(reference)
            .cloned())
    }

    async fn line_items(&self, transaction_id: TransactionId) -> AppResult<Vec<LineItem>> {
        let state = self.state.read().await;
        Ok(state
            .line_items
            .iter()
            .filter(|item| item.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    async fn settle(
        &self,
        reference: &str,
        status: TransactionStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<Transition<Transaction>> {
        let mut state = self.state.write().await;
        let current = state
            .transaction_by_reference(reference)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Transaction '{reference}' not found")))?;

        if current.status.is_terminal() || !status.is_terminal() {
            return Ok(Transition::Unchanged(current));
        }

        let mut settled = current;
        settled.status = status;
        settled.paid_at = paid_at;
        settled.updated_at = Utc::now();
        let events = match settled.settlement_event() {
            Some(event) => records(&[event])?,
            None => Vec::new(),
        };

        state.transactions.insert(settled.id, settled.clone());
        state.push_events(events);
        Ok(Transition::Applied(settled))
    }

    async fn grant_checkout_access(
        &self,
        transaction_id: TransactionId,
    ) -> AppResult<FanoutReport> {
        let mut state = self.state.write().await;
        let buyer = state
            .transactions
            .get(&transaction_id)
            .filter(|t| t.status == TransactionStatus::Success)
            .map(|t| t.user_id)
            .ok_or_else(|| {
                AppError::validation("Only successful transactions grant course access")
            })?;

        let pairs: Vec<_> = state
            .line_items
            .iter()
            .filter(|item| item.transaction_id == transaction_id)
            .map(|item| (buyer, item.course_id))
            .collect();
        let enrollments_created = state.upsert_enrollments(&pairs, None, Some(transaction_id));
        let promoted = state.promote_to_students(&[buyer]);

        Ok(FanoutReport {
            members: 1,
            enrollments_created,
            promoted,
        })
    }
}
