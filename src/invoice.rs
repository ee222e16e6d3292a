//! Invoice documents derived from confirmed subscriptions.
//!
//! An invoice is a snapshot: its totals equal the originating
//! subscription's totals at confirmation time and are never re-derived
//! afterwards.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::CustomerId,
    subscription::{Subscription, SubscriptionId},
};

/// Days until a generated invoice falls due.
const DUE_DAYS: i64 = 7;

/// Line description used when a subscription item carries no name snapshot.
const FALLBACK_DESCRIPTION: &str = "Product";

/// Line description for the first-time membership fee.
const MEMBERSHIP_FEE_DESCRIPTION: &str = "Membership Fee";

/// Unique identifier for an invoice document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(Uuid);

impl InvoiceId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Generated, not yet sent or settled.
    Draft,
    /// Sent to the customer.
    Confirmed,
    /// Settled in full.
    Paid,
    /// Voided; will never be settled.
    Cancelled,
}

/// One billed line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Human-readable description.
    pub description: String,
    /// Units billed.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line total.
    pub amount: Decimal,
}

/// Invoice document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// Human-readable document number (`INV-nnnnnn`).
    pub number: String,
    /// Originating subscription, when the invoice was generated from one.
    pub subscription: Option<SubscriptionId>,
    /// Billed customer.
    pub customer: CustomerId,
    /// Billed lines.
    pub lines: Vec<InvoiceLine>,
    /// Sum of all line amounts, before discount and tax.
    pub subtotal: Decimal,
    /// Discount carried over from the subscription.
    pub discount_total: Decimal,
    /// Tax carried over from the subscription.
    pub tax_total: Decimal,
    /// Remaining prepaid balance carried over from the subscription.
    pub remaining_balance: Decimal,
    /// Amount due.
    pub total: Decimal,
    /// Current lifecycle state.
    pub status: InvoiceStatus,
    /// Generation timestamp.
    pub issued_at: DateTime<Utc>,
    /// Payment deadline.
    pub due_date: DateTime<Utc>,
}

impl Invoice {
    /// Builds the invoice for a freshly confirmed subscription.
    ///
    /// Lines derive from the subscription's item snapshots (with a generic
    /// description when a name snapshot is empty), followed by a
    /// membership-fee line when the subscription carries one. All totals
    /// are copied, so `invoice.total` equals the subscription's
    /// `total_amount` at this instant. The invoice falls due seven days
    /// after issue.
    #[must_use]
    pub fn for_subscription(number: String, subscription: &Subscription, issued_at: DateTime<Utc>) -> Self {
        let mut lines: Vec<InvoiceLine> = subscription
            .items
            .iter()
            .map(|item| InvoiceLine {
                description: if item.name.is_empty() {
                    FALLBACK_DESCRIPTION.to_owned()
                } else {
                    item.name.clone()
                },
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount: item.amount,
            })
            .collect();
        if subscription.membership_fee > Decimal::ZERO {
            lines.push(InvoiceLine {
                description: MEMBERSHIP_FEE_DESCRIPTION.to_owned(),
                quantity: 1,
                unit_price: subscription.membership_fee,
                amount: subscription.membership_fee,
            });
        }

        Self {
            id: InvoiceId::generate(),
            number,
            subscription: Some(subscription.id),
            customer: subscription.customer.clone(),
            lines,
            subtotal: subscription.service_cost + subscription.membership_fee,
            discount_total: subscription.discount_total,
            tax_total: subscription.tax_total,
            remaining_balance: subscription.remaining_balance,
            total: subscription.total_amount,
            status: InvoiceStatus::Draft,
            issued_at,
            due_date: issued_at + Duration::days(DUE_DAYS),
        }
    }
}
