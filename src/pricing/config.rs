//! Pricing engine configuration.
//!
//! Every fallback constant the engine consults lives here as injectable
//! data: the interval-keyed flat discount table, the default tax rate, the
//! first-visit membership fee, and the loyalty-credit table. The defaults
//! reproduce the stock salon policy; deployments override them by
//! deserializing their own configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::BillingInterval;

/// Currency amount per billing interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalAmounts {
    /// Amount for monthly plans.
    pub monthly: Decimal,
    /// Amount for quarterly plans.
    pub quarterly: Decimal,
    /// Amount for half-yearly plans.
    pub half_yearly: Decimal,
    /// Amount for yearly plans.
    pub yearly: Decimal,
}

impl IntervalAmounts {
    /// Returns the amount keyed by the given interval.
    #[must_use]
    pub fn get(&self, interval: BillingInterval) -> Decimal {
        match interval {
            BillingInterval::Monthly => self.monthly,
            BillingInterval::Quarterly => self.quarterly,
            BillingInterval::HalfYearly => self.half_yearly,
            BillingInterval::Yearly => self.yearly,
        }
    }
}

/// Loyalty credit count per billing interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCredits {
    /// Credits for monthly plans.
    pub monthly: u32,
    /// Credits for quarterly plans.
    pub quarterly: u32,
    /// Credits for half-yearly plans.
    pub half_yearly: u32,
    /// Credits for yearly plans.
    pub yearly: u32,
}

impl IntervalCredits {
    /// Returns the credit count keyed by the given interval.
    #[must_use]
    pub fn get(&self, interval: BillingInterval) -> u32 {
        match interval {
            BillingInterval::Monthly => self.monthly,
            BillingInterval::Quarterly => self.quarterly,
            BillingInterval::HalfYearly => self.half_yearly,
            BillingInterval::Yearly => self.yearly,
        }
    }
}

/// Injected configuration for the pricing engine and lifecycle fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Flat discount applied when no discount rule matches, keyed by the
    /// plan's billing interval.
    pub fallback_discounts: IntervalAmounts,
    /// Tax rate (percentage) applied when no tax rule matches.
    pub default_tax_rate: Decimal,
    /// One-time fee charged on a first-time customer's subscription.
    pub membership_fee: Decimal,
    /// Loyalty credits granted at confirmation, keyed by the plan's
    /// billing interval.
    pub loyalty_credits: IntervalCredits,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fallback_discounts: IntervalAmounts {
                monthly: Decimal::new(100, 0),
                quarterly: Decimal::new(200, 0),
                half_yearly: Decimal::new(300, 0),
                yearly: Decimal::new(400, 0),
            },
            default_tax_rate: Decimal::new(10, 0),
            membership_fee: Decimal::new(50, 0),
            loyalty_credits: IntervalCredits { monthly: 5, quarterly: 10, half_yearly: 15, yearly: 10 },
        }
    }
}
