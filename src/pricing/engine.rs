//! The pricing engine: pure billing computation.
//!
//! Given a plan, a service selection, and the active rule sets, the engine
//! produces a [`BillingBreakdown`]. It performs no store access and no side
//! effects; identical inputs always yield identical output.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    config::PricingConfig,
    resolution::{RuleContext, resolve_discount, resolve_tax_rate},
};
use crate::{
    catalog::{CustomerId, DiscountKind, DiscountRule, Plan, Product, ProductId, TaxRule},
    error::{BillingError, Result},
};

/// Snapshot of one selected service on a subscription or invoice.
///
/// Line items capture name and price at computation time; later catalog
/// edits do not flow back into existing documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the line was priced from.
    pub product: ProductId,
    /// Product name at computation time.
    pub name: String,
    /// Units selected.
    pub quantity: u32,
    /// Price per unit at computation time.
    pub unit_price: Decimal,
    /// Line total (`unit_price` × `quantity`).
    pub amount: Decimal,
}

/// Result of a billing computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingBreakdown {
    /// Plan price snapshotted at computation time.
    pub plan_amount: Decimal,
    /// Selected services as priced line items.
    pub items: Vec<LineItem>,
    /// Sum of all line amounts.
    pub service_cost: Decimal,
    /// Applied discount, capped at `service_cost`.
    pub discount_total: Decimal,
    /// Tax on the discounted base.
    pub tax_total: Decimal,
    /// Amount owed: discounted base plus tax.
    pub total_amount: Decimal,
    /// Unused prepaid plan value; negative signals an overage.
    pub remaining_balance: Decimal,
    /// First day of the billing period.
    pub start_date: DateTime<Utc>,
    /// Last day of the billing period, one interval after the start.
    pub end_date: DateTime<Utc>,
}

/// Pure pricing computation over catalog reference data.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Returns the injected configuration.
    #[must_use]
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Computes the billing breakdown for a plan and service selection.
    ///
    /// The selection may be empty, in which case billing reduces to the
    /// plan price alone (zero cost, zero discount, zero tax). Missing rule
    /// sets mean "no discount" and "default tax", never an error.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::NotFound`] if a selected service is absent
    /// from the product catalog, and [`BillingError::Validation`] for
    /// negative prices or an out-of-range start date.
    pub fn compute_billing(
        &self,
        plan: &Plan,
        selected_services: &[ProductId],
        customer: &CustomerId,
        start_date: DateTime<Utc>,
        products: &[Product],
        discount_rules: &[DiscountRule],
        tax_rules: &[TaxRule],
    ) -> Result<BillingBreakdown> {
        if plan.price.is_sign_negative() {
            return Err(BillingError::Validation(format!(
                "plan {} has a negative price",
                plan.id
            )));
        }

        let items = snapshot_items(selected_services, products)?;
        let service_cost: Decimal = items.iter().map(|item| item.amount).sum();

        let ctx = RuleContext { customer, plan: &plan.id, interval: plan.interval, at: start_date };
        let raw_discount = match resolve_discount(discount_rules, &ctx) {
            Some(rule) => {
                debug!(rule = %rule.id, "discount rule matched");
                rule_deduction(rule, &items, service_cost)
            }
            None => self.config.fallback_discounts.get(plan.interval),
        };
        // Capping at the service cost keeps every downstream field
        // non-negative; an empty selection therefore carries no discount.
        let discount_total = raw_discount.min(service_cost);

        let taxable_base = (service_cost - discount_total).max(Decimal::ZERO);
        let tax_rate = resolve_tax_rate(tax_rules, plan.interval, self.config.default_tax_rate);
        let tax_total = round2(taxable_base * tax_rate / Decimal::ONE_HUNDRED);
        let total_amount = taxable_base + tax_total;
        let remaining_balance = plan.price - taxable_base;

        let end_date = plan.interval.advance(start_date).ok_or_else(|| {
            BillingError::Validation("start date is out of calendar range".to_owned())
        })?;

        debug!(%service_cost, %discount_total, %tax_total, %total_amount, "billing computed");

        Ok(BillingBreakdown {
            plan_amount: plan.price,
            items,
            service_cost,
            discount_total,
            tax_total,
            total_amount,
            remaining_balance,
            start_date,
            end_date,
        })
    }
}

/// Rounds a currency amount to two decimal places, midpoint away from zero.
fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Deduction produced by a matched discount rule.
///
/// A rule targeting specific products discounts each matching line item
/// individually (capped at the line amount); otherwise the deduction is
/// taken from the whole service cost.
fn rule_deduction(rule: &DiscountRule, items: &[LineItem], service_cost: Decimal) -> Decimal {
    if rule.applicable_products.is_empty() {
        deduction(rule.kind, rule.value, service_cost)
    } else {
        items
            .iter()
            .filter(|item| rule.applicable_products.contains(&item.product))
            .map(|item| deduction(rule.kind, rule.value, item.amount).min(item.amount))
            .sum()
    }
}

fn deduction(kind: DiscountKind, value: Decimal, base: Decimal) -> Decimal {
    match kind {
        DiscountKind::Fixed => value,
        DiscountKind::Percentage => round2(base * value / Decimal::ONE_HUNDRED),
    }
}

/// Prices the selection into line items; duplicate ids collapse into
/// quantity.
fn snapshot_items(selected: &[ProductId], products: &[Product]) -> Result<Vec<LineItem>> {
    let mut items: Vec<LineItem> = Vec::new();
    for id in selected {
        let product = products
            .iter()
            .find(|product| product.id == *id)
            .ok_or_else(|| BillingError::NotFound(format!("product {id}")))?;
        if product.sales_price.is_sign_negative() {
            return Err(BillingError::Validation(format!(
                "product {id} has a negative sales price"
            )));
        }
        match items.iter_mut().find(|item| item.product == *id) {
            Some(item) => {
                item.quantity += 1;
                item.amount = item.unit_price * Decimal::from(item.quantity);
            }
            None => items.push(LineItem {
                product: product.id.clone(),
                name: product.name.clone(),
                quantity: 1,
                unit_price: product.sales_price,
                amount: product.sales_price,
            }),
        }
    }
    Ok(items)
}
