//! PostgreSQL implementation of the commerce stores.
//!
//! Every mutation runs inside one sqlx transaction. Writes to a group row
//! take `SELECT ... FOR UPDATE` first; the schema's CHECK constraints reject
//! anything that would still over-fill a group.

mod catalog;
mod group;
mod ledger;
mod outbox;
mod promo;

use sqlx::{PgConnection, PgPool};

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::events::DomainEvent;
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, GroupPurchaseId, TransactionId, UserId};
use coursehub_entity::ledger::{LineItem, Transaction};
use coursehub_entity::outbox::CommerceEventRecord;

/// Commerce store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCommerceStore {
    pool: PgPool,
}

impl PgCommerceStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }
}

async fn commit(tx: sqlx::Transaction<'_, sqlx::Postgres>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))
}

/// Name of the unique constraint an insert violated, if that is the failure.
fn violated_unique(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}

async fn insert_event(conn: &mut PgConnection, event: &DomainEvent) -> AppResult<()> {
    let record = CommerceEventRecord::from_event(event)?;
    sqlx::query(
        "INSERT INTO commerce_events (id, event_type, payload, created_at, attempts) \
         VALUES ($1, $2, $3, $4, 0)",
    )
    .bind(record.id)
    .bind(&record.event_type)
    .bind(&record.payload)
    .bind(record.created_at)
    .execute(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write outbox event", e))?;
    Ok(())
}

async fn insert_transaction(
    conn: &mut PgConnection,
    transaction: &Transaction,
    items: &[LineItem],
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, reference, status, amount, subtotal_amount, \
         discount_amount, vat_amount, tutor_share_amount, platform_share_amount, currency, \
         promo_code_id, group_purchase_id, paid_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(transaction.id)
    .bind(transaction.user_id)
    .bind(&transaction.reference)
    .bind(transaction.status)
    .bind(transaction.amount)
    .bind(transaction.subtotal_amount)
    .bind(transaction.discount_amount)
    .bind(transaction.vat_amount)
    .bind(transaction.tutor_share_amount)
    .bind(transaction.platform_share_amount)
    .bind(&transaction.currency)
    .bind(transaction.promo_code_id)
    .bind(transaction.group_purchase_id)
    .bind(transaction.paid_at)
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match violated_unique(&e) {
        Some("transactions_reference_key") => {
            AppError::conflict(format!("Reference '{}' already recorded", transaction.reference))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to record transaction", e),
    })?;

    for item in items {
        sqlx::query(
            "INSERT INTO transaction_line_items (id, transaction_id, course_id, unit_price, \
             discount_amount, discounted_price, vat_amount, total_amount, tutor_share_amount, \
             platform_share_amount) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(item.id)
        .bind(item.transaction_id)
        .bind(item.course_id)
        .bind(item.unit_price)
        .bind(item.discount_amount)
        .bind(item.discounted_price)
        .bind(item.vat_amount)
        .bind(item.total_amount)
        .bind(item.tutor_share_amount)
        .bind(item.platform_share_amount)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record line item", e))?;
    }

    insert_event(conn, &transaction.created_event()).await
}

/// Upsert ACTIVE enrollments for `(user, course)` pairs and return how many
/// rows were newly inserted.
async fn upsert_enrollments(
    conn: &mut PgConnection,
    user_ids: &[UserId],
    course_ids: &[CourseId],
    group_purchase_id: Option<GroupPurchaseId>,
    transaction_id: Option<TransactionId>,
) -> AppResult<usize> {
    let inserted: Vec<bool> = sqlx::query_scalar(
        "INSERT INTO enrollments (id, user_id, course_id, status, group_purchase_id, transaction_id, created_at) \
         SELECT gen_random_uuid(), pair.user_id, pair.course_id, 'ACTIVE'::enrollment_status, $3, $4, NOW() \
         FROM UNNEST($1::uuid[], $2::uuid[]) AS pair(user_id, course_id) \
         ON CONFLICT (user_id, course_id) DO UPDATE SET status = 'ACTIVE'::enrollment_status, \
             group_purchase_id = COALESCE(enrollments.group_purchase_id, EXCLUDED.group_purchase_id), \
             transaction_id = COALESCE(enrollments.transaction_id, EXCLUDED.transaction_id) \
         RETURNING (xmax = 0)",
    )
    .bind(user_ids)
    .bind(course_ids)
    .bind(group_purchase_id)
    .bind(transaction_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert enrollments", e))?;

    Ok(inserted.into_iter().filter(|fresh| *fresh).count())
}

/// Promote USER rows among `user_ids` to STUDENT and upsert their student
/// profiles. Other roles are left alone.
async fn promote_to_students(
    conn: &mut PgConnection,
    user_ids: &[UserId],
) -> AppResult<usize> {
    let promoted: Vec<UserId> = sqlx::query_scalar(
        "UPDATE users SET role = 'STUDENT'::user_role, updated_at = NOW() \
         WHERE id = ANY($1) AND role = 'USER'::user_role RETURNING id",
    )
    .bind(user_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to promote users", e))?;

    sqlx::query(
        "INSERT INTO students (user_id, created_at) SELECT UNNEST($1::uuid[]), NOW() \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(&promoted)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create student profiles", e))?;

    Ok(promoted.len())
}
