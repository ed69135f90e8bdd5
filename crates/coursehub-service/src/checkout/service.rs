//! Single checkout: price, record PENDING, open the gateway session.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, TransactionId};
use coursehub_database::store::{CatalogStore, LedgerStore};
use coursehub_entity::course::Course;
use coursehub_entity::promo::PromoCode;
use coursehub_payment::new_reference;

use super::ledger::ledger_rows;
use crate::context::RequestContext;
use crate::payment::PaymentSessions;
use crate::pricing::{CheckoutTotals, PricingEngine};
use crate::promo::{PromoDecision, PromoRejection, PromoValidator};

/// Request to buy one or more courses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Courses to buy; duplicates are ignored.
    pub course_ids: Vec<CourseId>,
    /// Optional promo code, validated server-side.
    pub promo_code: Option<String>,
}

/// Result of a recorded checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    /// Local transaction ID.
    pub transaction_id: TransactionId,
    /// Gateway reference.
    pub reference: String,
    /// Hosted payment page.
    pub authorization_url: String,
    /// Gateway access code.
    pub access_code: String,
    /// Currency charged.
    pub currency: String,
    /// Priced breakdown.
    pub totals: CheckoutTotals,
}

/// Price preview, with the promo outcome reported instead of enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutQuote {
    /// The promo that was applied, if any.
    pub promo_code: Option<String>,
    /// Why the supplied promo was not applied.
    pub promo_rejection: Option<PromoRejection>,
    /// Priced breakdown.
    pub totals: CheckoutTotals,
}

/// Orchestrates single (non-group) checkouts.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn LedgerStore>,
    promos: PromoValidator,
    pricing: PricingEngine,
    sessions: PaymentSessions,
    vat_rate: Decimal,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("pricing", &self.pricing)
            .field("vat_rate", &self.vat_rate)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn LedgerStore>,
        promos: PromoValidator,
        pricing: PricingEngine,
        sessions: PaymentSessions,
        vat_rate: Decimal,
    ) -> Self {
        Self {
            catalog,
            ledger,
            promos,
            pricing,
            sessions,
            vat_rate,
        }
    }

    /// Record a PENDING transaction for the requested courses and open a
    /// payment session for it.
    ///
    /// Every validation failure returns before anything is written. A gateway
    /// failure after the ledger write leaves the transaction PENDING.
    pub async fn checkout(
        &self,
        ctx: &RequestContext,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutReceipt> {
        let courses = self.load_courses(ctx, &request.course_ids).await?;

        let promo = match normalized_code(request.promo_code.as_deref()) {
            None => None,
            Some(code) => match self
                .promos
                .validate_for_courses(code, ctx.user_id, &courses)
                .await?
            {
                PromoDecision::Valid(promo) => Some(promo),
                PromoDecision::Rejected(reason) => {
                    return Err(AppError::validation(reason.message()));
                }
            },
        };

        let totals = self
            .pricing
            .compute_checkout_totals(&courses, promo.as_ref(), self.vat_rate)?;

        let (transaction, items) = ledger_rows(
            ctx.user_id,
            new_reference(),
            self.sessions.currency(),
            &totals,
            promo.as_ref().map(|p| p.id),
            None,
        );
        self.ledger.record_checkout(&transaction, &items).await?;

        info!(
            user_id = %ctx.user_id,
            reference = %transaction.reference,
            courses = items.len(),
            amount = %transaction.amount,
            promo = promo.as_ref().map(|p| p.code.as_str()).unwrap_or("-"),
            "Checkout recorded"
        );

        let session = self.sessions.open(ctx, &transaction).await?;

        Ok(CheckoutReceipt {
            transaction_id: transaction.id,
            reference: transaction.reference,
            authorization_url: session.authorization_url,
            access_code: session.access_code,
            currency: transaction.currency,
            totals,
        })
    }

    /// Price the request without recording anything.
    ///
    /// A rejected promo is reported and the courses are priced without it.
    pub async fn quote(
        &self,
        ctx: &RequestContext,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutQuote> {
        let courses = self.load_courses(ctx, &request.course_ids).await?;
        let course_ids: Vec<CourseId> = courses.iter().map(|course| course.id).collect();

        let (promo, promo_rejection): (Option<PromoCode>, Option<PromoRejection>) =
            match normalized_code(request.promo_code.as_deref()) {
                None => (None, None),
                Some(code) => match self
                    .promos
                    .validate_promo_code(code, ctx.user_id, &course_ids)
                    .await?
                {
                    PromoDecision::Valid(promo) => (Some(promo), None),
                    PromoDecision::Rejected(reason) => (None, Some(reason)),
                },
            };

        let totals = self
            .pricing
            .compute_checkout_totals(&courses, promo.as_ref(), self.vat_rate)?;

        Ok(CheckoutQuote {
            promo_code: promo.map(|p| p.code),
            promo_rejection,
            totals,
        })
    }

    /// Load the requested courses in request order, deduplicated.
    ///
    /// Unknown courses are `NotFound`; courses the caller already owns are a
    /// validation error.
    async fn load_courses(
        &self,
        ctx: &RequestContext,
        course_ids: &[CourseId],
    ) -> AppResult<Vec<Course>> {
        let mut seen = HashSet::new();
        let ids: Vec<CourseId> = course_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Err(AppError::validation("Select at least one course"));
        }

        let mut found: HashMap<CourseId, Course> = self
            .catalog
            .find_courses(&ids)
            .await?
            .into_iter()
            .map(|course| (course.id, course))
            .collect();

        let courses = ids
            .iter()
            .map(|id| {
                found
                    .remove(id)
                    .ok_or_else(|| AppError::not_found(format!("Course '{id}' not found")))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let owned = self.catalog.enrolled_course_ids(ctx.user_id, &ids).await?;
        if !owned.is_empty() {
            return Err(AppError::validation(
                "You are already enrolled in one of the selected courses",
            ));
        }

        Ok(courses)
    }
}

fn normalized_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}
