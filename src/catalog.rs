//! Catalog and rule reference data.
//!
//! This module defines the read-only reference documents the billing core
//! computes against: plans, products, discount rules, tax rules, and the
//! customer profile fields the lifecycle mutates.

use std::fmt;

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};

/// Maximum length for externally supplied identifiers.
const MAX_ID_LEN: usize = 64;

macro_rules! validated_id {
    ($(#[$meta:meta])* $name:ident, $label:expr, $err:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier after validation.
            ///
            /// # Errors
            ///
            /// Returns an error if the id is empty, exceeds 64 characters,
            /// or contains characters outside alphanumerics, hyphens, and
            /// underscores.
            pub fn new<S: Into<String>>(id: S) -> Result<Self> {
                let id = id.into();
                if id.is_empty() {
                    return Err($err(format!("{} cannot be empty", $label)));
                }
                if id.len() > MAX_ID_LEN {
                    return Err($err(format!("{} must be {MAX_ID_LEN} characters or less", $label)));
                }
                if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                    return Err($err(format!(
                        "{} can only contain alphanumeric characters, hyphens, and underscores",
                        $label
                    )));
                }
                Ok(Self(id))
            }

            /// Returns the inner string reference.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

validated_id!(
    /// Unique identifier for a subscription plan.
    ///
    /// Wraps the document-store plan id with type safety.
    PlanId,
    "plan id",
    BillingError::InvalidPlan
);

validated_id!(
    /// Unique identifier for a product or salon service.
    ProductId,
    "product id",
    BillingError::Validation
);

validated_id!(
    /// Unique identifier for a customer account.
    CustomerId,
    "customer id",
    BillingError::Validation
);

validated_id!(
    /// Unique identifier for a discount rule.
    DiscountId,
    "discount id",
    BillingError::Validation
);

validated_id!(
    /// Unique identifier for a tax rule.
    TaxRuleId,
    "tax rule id",
    BillingError::Validation
);

/// Billing interval of a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Billed every month.
    Monthly,
    /// Billed every three months.
    Quarterly,
    /// Billed every six months.
    HalfYearly,
    /// Billed every year.
    Yearly,
}

impl BillingInterval {
    /// All intervals, in ascending duration order.
    pub const ALL: [Self; 4] = [Self::Monthly, Self::Quarterly, Self::HalfYearly, Self::Yearly];

    /// Returns the interval length in calendar months.
    #[must_use]
    pub fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Yearly => 12,
        }
    }

    /// Advances a start date by one billing interval.
    ///
    /// Returns `None` only when the resulting date would overflow the
    /// calendar range, which cannot happen for any realistic start date.
    #[must_use]
    pub fn advance(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_months(Months::new(self.months()))
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::HalfYearly => "half_yearly",
            Self::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Interval scope of a discount or tax rule.
///
/// The wildcard is an explicit variant rather than a sentinel string, so a
/// rule that applies to every interval is distinguishable from one pinned
/// to a specific interval at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntervalScope {
    /// The rule applies to every billing interval.
    #[default]
    All,
    /// The rule applies only to the given billing interval.
    Only(BillingInterval),
}

impl IntervalScope {
    /// Returns true if the scope covers the given interval.
    #[must_use]
    pub fn accepts(self, interval: BillingInterval) -> bool {
        match self {
            Self::All => true,
            Self::Only(scoped) => scoped == interval,
        }
    }

    /// Returns true if the scope is pinned to exactly the given interval.
    #[must_use]
    pub fn is_exact(self, interval: BillingInterval) -> bool {
        matches!(self, Self::Only(scoped) if scoped == interval)
    }
}

/// Lifecycle options of a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Whether the subscription may be closed before its end date.
    pub closable: bool,
    /// Whether the subscription may be paused.
    pub pausable: bool,
    /// Whether the subscription may be renewed at expiry.
    pub renewable: bool,
    /// Whether the subscription closes automatically at its end date.
    pub auto_close: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { closable: true, pausable: true, renewable: true, auto_close: false }
    }
}

/// Subscription plan: a prepaid tier with a price and billing interval.
///
/// Plans are immutable reference data during a subscription's life; the
/// price and interval are snapshotted into the subscription at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Prepaid plan price per billing interval.
    pub price: Decimal,
    /// Billing interval.
    pub interval: BillingInterval,
    /// Services bundled into the plan.
    pub services_included: Vec<ProductId>,
    /// Lifecycle options.
    #[serde(default)]
    pub options: PlanOptions,
    /// Whether the plan is available for new subscriptions.
    pub active: bool,
}

/// Kind of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// A salon service performed for the customer.
    Service,
    /// A sellable good.
    Goods,
}

/// Catalog product, used both as a salon service and as a sellable add-on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Sales price per unit.
    pub sales_price: Decimal,
    /// Product category.
    pub category: String,
    /// Service or goods.
    pub kind: ProductKind,
    /// Whether the product can currently be selected.
    pub active: bool,
}

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Flat currency deduction.
    Fixed,
    /// Percentage of the discounted base (0-100).
    Percentage,
}

/// Conditional price reduction scoped by customer, plan, interval, and
/// products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Unique rule identifier.
    pub id: DiscountId,
    /// Display name.
    pub name: String,
    /// Fixed or percentage.
    pub kind: DiscountKind,
    /// Deduction value; currency amount for fixed, 0-100 for percentage.
    pub value: Decimal,
    /// Restricts the rule to one customer.
    pub customer: Option<CustomerId>,
    /// Restricts the rule to one plan.
    pub plan: Option<PlanId>,
    /// Restricts the rule to a billing interval, or covers all of them.
    #[serde(default)]
    pub interval: IntervalScope,
    /// When non-empty, the discount applies per matching line item instead
    /// of the whole service cost.
    #[serde(default)]
    pub applicable_products: Vec<ProductId>,
    /// Validity window start.
    pub starts_at: Option<DateTime<Utc>>,
    /// Validity window end.
    pub ends_at: Option<DateTime<Utc>>,
    /// Whether the rule participates in resolution at all.
    pub is_active: bool,
}

impl DiscountRule {
    /// Returns true if the rule may participate in resolution at the given
    /// instant: it is active, its value is non-negative, and the instant
    /// falls inside its validity window.
    #[must_use]
    pub fn is_eligible(&self, at: DateTime<Utc>) -> bool {
        if !self.is_active || self.value.is_sign_negative() {
            return false;
        }
        if let Some(starts_at) = self.starts_at {
            if at < starts_at {
                return false;
            }
        }
        if let Some(ends_at) = self.ends_at {
            if at > ends_at {
                return false;
            }
        }
        true
    }
}

/// Conditional surcharge scoped by billing interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRule {
    /// Unique rule identifier.
    pub id: TaxRuleId,
    /// Display name.
    pub name: String,
    /// Tax rate as a percentage (0-100).
    pub percentage: Decimal,
    /// Restricts the rule to a billing interval, or covers all of them.
    #[serde(default)]
    pub interval: IntervalScope,
    /// Whether the rule participates in resolution at all.
    pub is_active: bool,
}

impl TaxRule {
    /// Returns true if the rule may participate in resolution: it is
    /// active and its rate is non-negative.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.is_active && !self.percentage.is_sign_negative()
    }
}

/// Customer account fields the billing core reads and mutates.
///
/// Account credentials, roles, and contact workflows live outside this
/// crate; the lifecycle only touches loyalty credits and the first-visit
/// flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Accumulated loyalty points.
    pub total_credits: u32,
    /// True until the customer's first subscription is confirmed.
    pub is_first_time: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ========================================================================
    // Identifier Tests
    // ========================================================================

    #[test]
    fn test_plan_id_valid() {
        let id = PlanId::new("plan-gold_1").unwrap();
        assert_eq!(id.as_str(), "plan-gold_1");
    }

    #[test]
    fn test_plan_id_empty_rejected() {
        let result = PlanId::new("");
        assert!(matches!(result.unwrap_err(), BillingError::InvalidPlan(_)));
    }

    #[test]
    fn test_plan_id_too_long_rejected() {
        let result = PlanId::new("a".repeat(65));
        assert!(matches!(result.unwrap_err(), BillingError::InvalidPlan(_)));
    }

    #[test]
    fn test_plan_id_exactly_64_chars_accepted() {
        let exactly_64 = "a".repeat(64);
        assert!(PlanId::new(exactly_64).is_ok());
    }

    #[test]
    fn test_customer_id_rejects_special_chars() {
        let result = CustomerId::new("cust@1");
        assert!(matches!(result.unwrap_err(), BillingError::Validation(_)));
    }

    #[test]
    fn test_product_id_rejects_path_traversal() {
        assert!(ProductId::new("../etc/passwd").is_err());
    }

    #[test]
    fn test_id_display_matches_inner() {
        let id = DiscountId::new("disc-7").unwrap();
        assert_eq!(id.to_string(), "disc-7");
    }

    // ========================================================================
    // BillingInterval Tests
    // ========================================================================

    #[test]
    fn test_interval_months() {
        assert_eq!(BillingInterval::Monthly.months(), 1);
        assert_eq!(BillingInterval::Quarterly.months(), 3);
        assert_eq!(BillingInterval::HalfYearly.months(), 6);
        assert_eq!(BillingInterval::Yearly.months(), 12);
    }

    #[test]
    fn test_interval_advance_monthly() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let end = BillingInterval::Monthly.advance(start).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_interval_advance_yearly() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let end = BillingInterval::Yearly.advance(start).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_interval_advance_clamps_month_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let end = BillingInterval::Monthly.advance(start).unwrap();
        // January 31 + 1 month lands on February 29 (leap year).
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_interval_serialization() {
        let json = serde_json::to_string(&BillingInterval::HalfYearly).unwrap();
        assert_eq!(json, "\"half_yearly\"");
    }

    // ========================================================================
    // IntervalScope Tests
    // ========================================================================

    #[test]
    fn test_scope_all_accepts_everything() {
        for interval in BillingInterval::ALL {
            assert!(IntervalScope::All.accepts(interval));
        }
    }

    #[test]
    fn test_scope_only_accepts_exact_interval() {
        let scope = IntervalScope::Only(BillingInterval::Quarterly);
        assert!(scope.accepts(BillingInterval::Quarterly));
        assert!(!scope.accepts(BillingInterval::Monthly));
    }

    #[test]
    fn test_scope_all_is_never_exact() {
        for interval in BillingInterval::ALL {
            assert!(!IntervalScope::All.is_exact(interval));
        }
    }

    #[test]
    fn test_scope_default_is_all() {
        assert_eq!(IntervalScope::default(), IntervalScope::All);
    }

    // ========================================================================
    // Rule Eligibility Tests
    // ========================================================================

    fn rule(is_active: bool, value: Decimal) -> DiscountRule {
        DiscountRule {
            id: DiscountId::new("disc-1").unwrap(),
            name: "Festive".to_owned(),
            kind: DiscountKind::Fixed,
            value,
            customer: None,
            plan: None,
            interval: IntervalScope::All,
            applicable_products: vec![],
            starts_at: None,
            ends_at: None,
            is_active,
        }
    }

    #[test]
    fn test_discount_rule_active_no_window_is_eligible() {
        assert!(rule(true, Decimal::new(50, 0)).is_eligible(Utc::now()));
    }

    #[test]
    fn test_discount_rule_inactive_is_ineligible() {
        assert!(!rule(false, Decimal::new(50, 0)).is_eligible(Utc::now()));
    }

    #[test]
    fn test_discount_rule_negative_value_is_ineligible() {
        assert!(!rule(true, Decimal::new(-50, 0)).is_eligible(Utc::now()));
    }

    #[test]
    fn test_discount_rule_respects_validity_window() {
        let now = Utc::now();
        let mut expired = rule(true, Decimal::new(50, 0));
        expired.ends_at = Some(now - chrono::Duration::days(1));
        assert!(!expired.is_eligible(now));

        let mut upcoming = rule(true, Decimal::new(50, 0));
        upcoming.starts_at = Some(now + chrono::Duration::days(1));
        assert!(!upcoming.is_eligible(now));

        let mut open = rule(true, Decimal::new(50, 0));
        open.starts_at = Some(now - chrono::Duration::days(1));
        open.ends_at = Some(now + chrono::Duration::days(1));
        assert!(open.is_eligible(now));
    }

    #[test]
    fn test_tax_rule_eligibility() {
        let mut tax = TaxRule {
            id: TaxRuleId::new("tax-1").unwrap(),
            name: "GST".to_owned(),
            percentage: Decimal::new(10, 0),
            interval: IntervalScope::All,
            is_active: true,
        };
        assert!(tax.is_eligible());
        tax.percentage = Decimal::new(-1, 0);
        assert!(!tax.is_eligible());
    }

    // ========================================================================
    // Plan Tests
    // ========================================================================

    #[test]
    fn test_plan_options_defaults() {
        let options = PlanOptions::default();
        assert!(options.closable);
        assert!(options.pausable);
        assert!(options.renewable);
        assert!(!options.auto_close);
    }

    #[test]
    fn test_plan_serde_roundtrip() {
        let plan = Plan {
            id: PlanId::new("plan-gold").unwrap(),
            name: "Gold".to_owned(),
            price: Decimal::new(100_000, 2),
            interval: BillingInterval::Monthly,
            services_included: vec![ProductId::new("svc-facial").unwrap()],
            options: PlanOptions::default(),
            active: true,
        };
        let json = serde_json::to_string(&plan).unwrap();
        let parsed: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, plan.id);
        assert_eq!(parsed.price, plan.price);
        assert_eq!(parsed.interval, plan.interval);
    }
}
