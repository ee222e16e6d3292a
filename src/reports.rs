//! Dashboard summaries over subscriptions and payments.
//!
//! Pure aggregation: the builders take document slices and produce report
//! values, leaving store access to the service layer.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    catalog::{Customer, CustomerId},
    payment::Payment,
    subscription::{Subscription, SubscriptionStatus},
};

/// Window ahead of `now` in which an active subscription counts as
/// expiring soon.
const EXPIRY_WINDOW_DAYS: i64 = 30;

/// Number of subscriptions listed on the admin dashboard.
const RECENT_LIMIT: usize = 5;

/// Per-customer dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerReport {
    /// Number of the customer's active subscriptions.
    pub active_subscriptions: usize,
    /// Lifetime amount the customer has paid.
    pub total_paid: Decimal,
    /// Active subscriptions ending within the next thirty days.
    pub expiring_soon: usize,
}

/// Admin dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct AdminReport {
    /// Total customer accounts.
    pub total_customers: usize,
    /// Active subscriptions across all customers.
    pub active_subscriptions: usize,
    /// Total revenue across all recorded payments.
    pub total_revenue: Decimal,
    /// Most recently created subscriptions, newest first.
    pub recent_subscriptions: Vec<Subscription>,
}

/// Builds the dashboard summary for one customer.
#[must_use]
pub fn customer_report(
    customer: &CustomerId,
    subscriptions: &[Subscription],
    payments: &[Payment],
    now: DateTime<Utc>,
) -> CustomerReport {
    let mine = || subscriptions.iter().filter(|sub| sub.customer == *customer);
    let horizon = now + Duration::days(EXPIRY_WINDOW_DAYS);

    CustomerReport {
        active_subscriptions: mine()
            .filter(|sub| sub.status == SubscriptionStatus::Active)
            .count(),
        total_paid: payments
            .iter()
            .filter(|payment| payment.customer == *customer)
            .map(|payment| payment.amount)
            .sum(),
        expiring_soon: mine()
            .filter(|sub| sub.status == SubscriptionStatus::Active && sub.end_date <= horizon)
            .count(),
    }
}

/// Builds the admin dashboard summary.
#[must_use]
pub fn admin_report(
    customers: &[Customer],
    subscriptions: &[Subscription],
    payments: &[Payment],
) -> AdminReport {
    let mut recent: Vec<Subscription> = subscriptions.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_LIMIT);

    AdminReport {
        total_customers: customers.len(),
        active_subscriptions: subscriptions
            .iter()
            .filter(|sub| sub.status == SubscriptionStatus::Active)
            .count(),
        total_revenue: payments.iter().map(|payment| payment.amount).sum(),
        recent_subscriptions: recent,
    }
}
