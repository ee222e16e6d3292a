//! Payment records and reconciliation outcomes.
//!
//! Payments are append-only: once recorded they are never mutated, and
//! reconciliation only reads them. Settlement is full-or-overpayment — a
//! single payment either covers the invoice total or changes nothing.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{catalog::CustomerId, invoice::InvoiceId};

/// Unique identifier for a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the counter.
    Cash,
    /// Credit or debit card.
    Card,
    /// UPI transfer.
    Upi,
    /// Net banking transfer.
    NetBanking,
}

/// Append-only payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// Invoice the payment was posted against.
    pub invoice: InvoiceId,
    /// Paying customer.
    pub customer: CustomerId,
    /// Tendered amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When the payment was tendered.
    pub paid_at: DateTime<Utc>,
}

/// Request to record a payment against an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Invoice to settle.
    pub invoice: InvoiceId,
    /// Paying customer.
    pub customer: CustomerId,
    /// Tendered amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When the payment was tendered; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
}

/// What reconciling a payment did.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    /// The persisted payment record.
    pub payment: Payment,
    /// True if this payment settled the invoice.
    pub invoice_paid: bool,
    /// True if settling the invoice also activated its subscription.
    pub subscription_activated: bool,
}
