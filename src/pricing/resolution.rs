//! Discount and tax rule resolution.
//!
//! Rule precedence is an explicit ordered tier list evaluated by descending
//! specificity, not a chain of nested fallbacks. Exactly one discount rule
//! applies per computation; tiers never stack.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::catalog::{BillingInterval, CustomerId, DiscountRule, PlanId, TaxRule};

/// Inputs a rule is matched against.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Customer the billing is computed for.
    pub customer: &'a CustomerId,
    /// Plan the billing is computed against.
    pub plan: &'a PlanId,
    /// The plan's billing interval.
    pub interval: BillingInterval,
    /// Instant the rule validity windows are evaluated at.
    pub at: DateTime<Utc>,
}

/// Specificity tier of a discount rule.
///
/// Tiers are evaluated in the order of [`DISCOUNT_RESOLUTION_ORDER`]; the
/// first tier containing an eligible rule wins and resolution stops there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountTier {
    /// Rule pinned to this customer and this plan.
    CustomerPlan,
    /// Rule pinned to this customer, scoped by interval (or the wildcard).
    CustomerInterval,
    /// Rule open to any customer, pinned to this plan.
    Plan,
    /// Rule open to any customer, scoped by interval (or the wildcard).
    Interval,
}

/// Tier evaluation order, most specific first.
pub const DISCOUNT_RESOLUTION_ORDER: [DiscountTier; 4] = [
    DiscountTier::CustomerPlan,
    DiscountTier::CustomerInterval,
    DiscountTier::Plan,
    DiscountTier::Interval,
];

impl DiscountTier {
    /// Returns true if the rule belongs to this tier for the given context.
    ///
    /// A rule whose interval scope excludes the plan's interval never
    /// matches, regardless of tier.
    #[must_use]
    pub fn matches(self, rule: &DiscountRule, ctx: &RuleContext<'_>) -> bool {
        if !rule.interval.accepts(ctx.interval) {
            return false;
        }
        match self {
            Self::CustomerPlan => {
                rule.customer.as_ref() == Some(ctx.customer)
                    && rule.plan.as_ref() == Some(ctx.plan)
            }
            Self::CustomerInterval => {
                rule.customer.as_ref() == Some(ctx.customer) && rule.plan.is_none()
            }
            Self::Plan => rule.customer.is_none() && rule.plan.as_ref() == Some(ctx.plan),
            Self::Interval => rule.customer.is_none() && rule.plan.is_none(),
        }
    }
}

/// Resolves the single best discount rule for the given context.
///
/// Returns the first eligible rule of the most specific non-empty tier, or
/// `None` when no eligible rule matches (callers fall back to the
/// configured flat deduction). Rules are never combined across tiers.
#[must_use]
pub fn resolve_discount<'a>(
    rules: &'a [DiscountRule],
    ctx: &RuleContext<'_>,
) -> Option<&'a DiscountRule> {
    DISCOUNT_RESOLUTION_ORDER
        .into_iter()
        .find_map(|tier| rules.iter().find(|rule| rule.is_eligible(ctx.at) && tier.matches(rule, ctx)))
}

/// Resolves the tax rate for a billing interval.
///
/// An eligible rule pinned to exactly this interval wins over one carrying
/// the wildcard scope; with no eligible rule at all, the configured default
/// rate applies.
#[must_use]
pub fn resolve_tax_rate(rules: &[TaxRule], interval: BillingInterval, default_rate: Decimal) -> Decimal {
    let mut eligible = rules.iter().filter(|rule| rule.is_eligible());
    let wildcard = eligible.clone().find(|rule| rule.interval.accepts(interval));
    eligible
        .find(|rule| rule.interval.is_exact(interval))
        .or(wildcard)
        .map_or(default_rate, |rule| rule.percentage)
}
