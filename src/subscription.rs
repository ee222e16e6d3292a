//! Subscription documents and their lifecycle states.
//!
//! A subscription moves Draft (or Quotation) → Confirmed → Active → Closed.
//! Confirmation is performed by staff and generates the invoice; the hop to
//! Active happens when that invoice is paid in full. Closed is terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    catalog::{BillingInterval, CustomerId, PlanId},
    pricing::LineItem,
};

/// Unique identifier for a subscription document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a subscription.
///
/// ```text
/// Draft ─────┐
///            ├─► Confirmed ──► Active ──► Closed
/// Quotation ─┘                   │
///                                └──────► Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Customer-initiated draft awaiting confirmation.
    Draft,
    /// Staff-initiated draft awaiting confirmation.
    Quotation,
    /// Confirmed by staff; invoice generated, payment pending.
    Confirmed,
    /// Paid and running.
    Active,
    /// Terminated. Terminal: no further transitions.
    Closed,
}

impl SubscriptionStatus {
    /// Returns true if the subscription may be confirmed from this state.
    #[must_use]
    pub fn can_confirm(self) -> bool {
        matches!(self, Self::Draft | Self::Quotation)
    }

    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Quotation => "quotation",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A customer's purchase of a plan plus optional add-on services.
///
/// All monetary fields are snapshots from the pricing computation at
/// creation time; the plan's later edits never flow back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier.
    pub id: SubscriptionId,
    /// Human-readable document number (`SUB-nnnnnn`).
    pub number: String,
    /// Owning customer. Exactly one customer owns a subscription.
    pub customer: CustomerId,
    /// Plan the subscription was priced from.
    pub plan: PlanId,
    /// Billing interval snapshotted from the plan.
    pub interval: BillingInterval,
    /// First day of the billing period.
    pub start_date: DateTime<Utc>,
    /// Last day of the billing period.
    pub end_date: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: SubscriptionStatus,
    /// Selected add-on services as priced line items.
    pub items: Vec<LineItem>,
    /// Plan price snapshotted at creation.
    pub plan_amount: Decimal,
    /// Sum of all line amounts.
    pub service_cost: Decimal,
    /// Applied discount.
    pub discount_total: Decimal,
    /// Tax on the discounted base.
    pub tax_total: Decimal,
    /// One-time membership fee for first-time customers, zero otherwise.
    pub membership_fee: Decimal,
    /// Amount owed, membership fee included.
    pub total_amount: Decimal,
    /// Unused prepaid plan value; negative signals an overage.
    pub remaining_balance: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
