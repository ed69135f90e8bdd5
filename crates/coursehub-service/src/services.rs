//! Service wiring.

use std::sync::Arc;

use coursehub_core::config::AppConfig;
use coursehub_core::traits::NotificationDispatcher;
use coursehub_database::store::Stores;
use coursehub_payment::PaymentGateway;

use crate::checkout::CheckoutService;
use crate::group::GroupPurchaseCoordinator;
use crate::outbox::OutboxRelay;
use crate::payment::{PaymentService, PaymentSessions};
use crate::pricing::PricingEngine;
use crate::promo::PromoValidator;

/// Every commerce service, built from one store backend and one gateway.
#[derive(Debug, Clone)]
pub struct CommerceServices {
    /// Pricing rules.
    pub pricing: PricingEngine,
    /// Promo validation.
    pub promo: PromoValidator,
    /// Single checkout.
    pub checkout: CheckoutService,
    /// Group purchases.
    pub groups: GroupPurchaseCoordinator,
    /// Payment verification.
    pub payments: PaymentService,
    /// Outbox relay.
    pub relay: OutboxRelay,
}

impl CommerceServices {
    /// Wire the services.
    pub fn new(
        stores: Stores,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: &AppConfig,
    ) -> Self {
        let pricing = PricingEngine::new(config.commerce.platform_commission_rate);
        let sessions = PaymentSessions::new(gateway.clone(), config.payment.clone());
        let promo = PromoValidator::new(stores.promo.clone(), stores.catalog.clone());

        let checkout = CheckoutService::new(
            stores.catalog.clone(),
            stores.ledger.clone(),
            promo.clone(),
            pricing,
            sessions.clone(),
            config.commerce.vat_rate,
        );
        let groups = GroupPurchaseCoordinator::new(
            stores.catalog.clone(),
            stores.group.clone(),
            stores.ledger.clone(),
            pricing,
            sessions,
            config.commerce.clone(),
        );
        let payments = PaymentService::new(stores.ledger.clone(), gateway, groups.clone());
        let relay = OutboxRelay::new(stores.outbox, dispatcher, config.outbox.clone());

        Self {
            pricing,
            promo,
            checkout,
            groups,
            payments,
            relay,
        }
    }
}
