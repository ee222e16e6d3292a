//! Billing operations over a document store.
//!
//! [`BillingService`] is the surface the CRUD/API layer calls: subscription
//! creation, confirmation, closing, payment reconciliation, billing
//! previews, and dashboard reports. Multi-document updates are sequential
//! independent writes against the store — atomic intent, not transactional
//! guarantee.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    catalog::{CustomerId, PlanId, ProductId},
    error::{BillingError, Result},
    invoice::{Invoice, InvoiceStatus},
    payment::{NewPayment, Payment, PaymentId, PaymentOutcome},
    pricing::{BillingBreakdown, PricingConfig, PricingEngine},
    reports::{self, AdminReport, CustomerReport},
    store::Store,
    subscription::{Subscription, SubscriptionId, SubscriptionStatus},
};

/// Request to create a subscription or quotation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    /// Owning customer.
    pub customer: CustomerId,
    /// Plan to subscribe to.
    pub plan: PlanId,
    /// Selected add-on services; may be empty.
    pub service_ids: Vec<ProductId>,
    /// First day of the billing period.
    pub start_date: DateTime<Utc>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Billing, lifecycle, and reconciliation operations over a store.
#[derive(Debug)]
pub struct BillingService<S> {
    store: S,
    engine: PricingEngine,
}

impl<S: Store> BillingService<S> {
    /// Creates a service with the stock pricing configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, PricingConfig::default())
    }

    /// Creates a service with an injected pricing configuration.
    #[must_use]
    pub fn with_config(store: S, config: PricingConfig) -> Self {
        Self { store, engine: PricingEngine::new(config) }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the pricing engine.
    #[must_use]
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Computes a billing preview without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidPlan`] if the plan does not resolve,
    /// plus any pricing-engine error.
    pub fn compute_billing(
        &self,
        plan: &PlanId,
        service_ids: &[ProductId],
        customer: &CustomerId,
        start_date: DateTime<Utc>,
    ) -> Result<BillingBreakdown> {
        let Some(plan) = self.store.plan(plan)? else {
            return Err(BillingError::InvalidPlan(plan.to_string()));
        };
        let products = self.store.products()?;
        let discounts = self.store.discount_rules()?;
        let taxes = self.store.tax_rules()?;
        self.engine.compute_billing(
            &plan,
            service_ids,
            customer,
            start_date,
            &products,
            &discounts,
            &taxes,
        )
    }

    /// Creates a customer-initiated subscription in Draft.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidPlan`] if the plan does not resolve
    /// and [`BillingError::NotFound`] if the customer does not exist, plus
    /// any pricing-engine error.
    #[instrument(skip(self, request), fields(customer = %request.customer, plan = %request.plan))]
    pub fn create_subscription(&self, request: NewSubscription) -> Result<Subscription> {
        self.create(request, SubscriptionStatus::Draft)
    }

    /// Creates a staff-initiated quotation.
    ///
    /// Identical to [`Self::create_subscription`] except for the resulting
    /// state; a quotation confirms exactly like a draft.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_subscription`].
    #[instrument(skip(self, request), fields(customer = %request.customer, plan = %request.plan))]
    pub fn create_quotation(&self, request: NewSubscription) -> Result<Subscription> {
        self.create(request, SubscriptionStatus::Quotation)
    }

    fn create(&self, request: NewSubscription, status: SubscriptionStatus) -> Result<Subscription> {
        let Some(plan) = self.store.plan(&request.plan)? else {
            return Err(BillingError::InvalidPlan(request.plan.to_string()));
        };
        let Some(customer) = self.store.customer(&request.customer)? else {
            return Err(BillingError::NotFound(format!("customer {}", request.customer)));
        };

        let products = self.store.products()?;
        let discounts = self.store.discount_rules()?;
        let taxes = self.store.tax_rules()?;
        let breakdown = self.engine.compute_billing(
            &plan,
            &request.service_ids,
            &customer.id,
            request.start_date,
            &products,
            &discounts,
            &taxes,
        )?;

        let membership_fee = if customer.is_first_time {
            self.engine.config().membership_fee
        } else {
            Decimal::ZERO
        };

        let seq = self.store.next_subscription_seq()?;
        let subscription = Subscription {
            id: SubscriptionId::generate(),
            number: format!("SUB-{seq:06}"),
            customer: customer.id,
            plan: plan.id,
            interval: plan.interval,
            start_date: breakdown.start_date,
            end_date: breakdown.end_date,
            status,
            items: breakdown.items,
            plan_amount: breakdown.plan_amount,
            service_cost: breakdown.service_cost,
            discount_total: breakdown.discount_total,
            tax_total: breakdown.tax_total,
            membership_fee,
            total_amount: breakdown.total_amount + membership_fee,
            remaining_balance: breakdown.remaining_balance,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.store.insert_subscription(&subscription)?;

        info!(
            subscription = %subscription.number,
            status = %subscription.status,
            total = %subscription.total_amount,
            "subscription created"
        );
        Ok(subscription)
    }

    /// Confirms a draft or quotation and generates its invoice.
    ///
    /// Sets the subscription to Confirmed, grants the customer the
    /// interval-keyed loyalty credits, clears the first-visit flag, and
    /// persists the generated invoice — as sequential writes, in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::NotFound`] if the subscription does not
    /// exist and [`BillingError::Validation`] if its state does not allow
    /// confirmation.
    #[instrument(skip(self))]
    pub fn confirm_subscription(&self, id: &SubscriptionId) -> Result<(Subscription, Invoice)> {
        let Some(mut subscription) = self.store.subscription(id)? else {
            return Err(BillingError::NotFound(format!("subscription {id}")));
        };
        if !subscription.status.can_confirm() {
            return Err(BillingError::Validation(format!(
                "cannot confirm a {} subscription",
                subscription.status
            )));
        }

        subscription.status = SubscriptionStatus::Confirmed;
        self.store.update_subscription(&subscription)?;

        if let Some(mut customer) = self.store.customer(&subscription.customer)? {
            customer.total_credits +=
                self.engine.config().loyalty_credits.get(subscription.interval);
            customer.is_first_time = false;
            self.store.update_customer(&customer)?;
        } else {
            warn!(customer = %subscription.customer, "customer missing at confirmation, credits skipped");
        }

        let seq = self.store.next_invoice_seq()?;
        let invoice =
            Invoice::for_subscription(format!("INV-{seq:06}"), &subscription, Utc::now());
        self.store.insert_invoice(&invoice)?;

        info!(
            subscription = %subscription.number,
            invoice = %invoice.number,
            total = %invoice.total,
            "subscription confirmed"
        );
        Ok((subscription, invoice))
    }

    /// Closes a subscription. Terminal: a closed subscription never
    /// transitions again.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::NotFound`] if the subscription does not
    /// exist and [`BillingError::Validation`] if it is already closed.
    #[instrument(skip(self))]
    pub fn close_subscription(&self, id: &SubscriptionId) -> Result<Subscription> {
        let Some(mut subscription) = self.store.subscription(id)? else {
            return Err(BillingError::NotFound(format!("subscription {id}")));
        };
        if subscription.status.is_terminal() {
            return Err(BillingError::Validation(format!(
                "subscription {} is already closed",
                subscription.number
            )));
        }

        subscription.status = SubscriptionStatus::Closed;
        self.store.update_subscription(&subscription)?;

        info!(subscription = %subscription.number, "subscription closed");
        Ok(subscription)
    }

    /// Records a payment and reconciles it against its invoice.
    ///
    /// The payment is appended first; reconciliation then settles the
    /// invoice when the amount covers the total in full (no partial
    /// accumulation across payments) and activates the invoice's
    /// subscription unless it is already active or closed.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Validation`] for a negative amount and
    /// [`BillingError::NotFound`] if the invoice does not exist — the
    /// payment record has been appended by then (sequential writes).
    #[instrument(skip(self, request), fields(invoice = %request.invoice, amount = %request.amount))]
    pub fn record_payment(&self, request: NewPayment) -> Result<PaymentOutcome> {
        if request.amount.is_sign_negative() {
            return Err(BillingError::Validation(
                "payment amount cannot be negative".to_owned(),
            ));
        }

        let payment = Payment {
            id: PaymentId::generate(),
            invoice: request.invoice,
            customer: request.customer,
            amount: request.amount,
            method: request.method,
            paid_at: request.paid_at.unwrap_or_else(Utc::now),
        };
        self.store.append_payment(&payment)?;

        let Some(mut invoice) = self.store.invoice(&payment.invoice)? else {
            return Err(BillingError::NotFound(format!("invoice {}", payment.invoice)));
        };

        let mut invoice_paid = false;
        let mut subscription_activated = false;
        if invoice.status != InvoiceStatus::Paid && payment.amount >= invoice.total {
            invoice.status = InvoiceStatus::Paid;
            self.store.update_invoice(&invoice)?;
            invoice_paid = true;
            info!(invoice = %invoice.number, "invoice settled");

            if let Some(subscription_id) = invoice.subscription {
                if let Some(mut subscription) = self.store.subscription(&subscription_id)? {
                    if subscription.status != SubscriptionStatus::Active
                        && !subscription.status.is_terminal()
                    {
                        subscription.status = SubscriptionStatus::Active;
                        self.store.update_subscription(&subscription)?;
                        subscription_activated = true;
                        info!(subscription = %subscription.number, "subscription activated");
                    }
                }
            }
        }

        Ok(PaymentOutcome { payment, invoice_paid, subscription_activated })
    }

    /// Builds the dashboard summary for one customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub fn customer_report(&self, customer: &CustomerId) -> Result<CustomerReport> {
        let subscriptions = self.store.subscriptions()?;
        let payments = self.store.payments()?;
        Ok(reports::customer_report(customer, &subscriptions, &payments, Utc::now()))
    }

    /// Builds the admin dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub fn admin_report(&self) -> Result<AdminReport> {
        let customers = self.store.customers()?;
        let subscriptions = self.store.subscriptions()?;
        let payments = self.store.payments()?;
        Ok(reports::admin_report(&customers, &subscriptions, &payments))
    }
}
