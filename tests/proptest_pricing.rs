//! Property tests for the pricing engine.
//!
//! The engine is a pure function with hard output guarantees: monetary
//! fields never go negative (remaining balance excepted), at most one
//! discount rule applies, and identical inputs always produce identical
//! output.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use salon_billing::{
    PricingEngine,
    catalog::{
        BillingInterval, CustomerId, DiscountId, DiscountKind, DiscountRule, IntervalScope, Plan,
        PlanId, PlanOptions, Product, ProductId, ProductKind, TaxRule, TaxRuleId,
    },
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn customer() -> CustomerId {
    CustomerId::new("cust-1").unwrap()
}

fn plan(price_cents: i64, interval: BillingInterval) -> Plan {
    Plan {
        id: PlanId::new("plan-gold").unwrap(),
        name: "Gold".to_owned(),
        price: Decimal::new(price_cents, 2),
        interval,
        services_included: vec![],
        options: PlanOptions::default(),
        active: true,
    }
}

fn catalog_from(prices_cents: &[i64]) -> (Vec<Product>, Vec<ProductId>) {
    let products: Vec<Product> = prices_cents
        .iter()
        .enumerate()
        .map(|(index, cents)| Product {
            id: ProductId::new(format!("svc-{index}")).unwrap(),
            name: format!("Service {index}"),
            sales_price: Decimal::new(*cents, 2),
            category: "General".to_owned(),
            kind: ProductKind::Service,
            active: true,
        })
        .collect();
    let selected = products.iter().map(|product| product.id.clone()).collect();
    (products, selected)
}

fn discount(id: &str, kind: DiscountKind, value: Decimal, customer: Option<CustomerId>) -> DiscountRule {
    DiscountRule {
        id: DiscountId::new(id).unwrap(),
        name: id.to_owned(),
        kind,
        value,
        customer,
        plan: None,
        interval: IntervalScope::All,
        applicable_products: vec![],
        starts_at: None,
        ends_at: None,
        is_active: true,
    }
}

fn interval_strategy() -> impl Strategy<Value = BillingInterval> {
    prop_oneof![
        Just(BillingInterval::Monthly),
        Just(BillingInterval::Quarterly),
        Just(BillingInterval::HalfYearly),
        Just(BillingInterval::Yearly),
    ]
}

fn kind_strategy() -> impl Strategy<Value = DiscountKind> {
    prop_oneof![Just(DiscountKind::Fixed), Just(DiscountKind::Percentage)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_monetary_outputs_never_go_negative(
        plan_price in 0i64..=1_000_000,
        prices in prop::collection::vec(0i64..=100_000, 0..6),
        interval in interval_strategy(),
        kind in kind_strategy(),
        value in 0i64..=20_000,
        tax_pct in 0i64..=40,
    ) {
        let (products, selected) = catalog_from(&prices);
        let rules = vec![discount("disc-1", kind, Decimal::new(value, 2), None)];
        let taxes = vec![TaxRule {
            id: TaxRuleId::new("tax-1").unwrap(),
            name: "Levy".to_owned(),
            percentage: Decimal::new(tax_pct, 0),
            interval: IntervalScope::All,
            is_active: true,
        }];

        let breakdown = PricingEngine::default()
            .compute_billing(
                &plan(plan_price, interval),
                &selected,
                &customer(),
                start(),
                &products,
                &rules,
                &taxes,
            )
            .unwrap();

        prop_assert!(breakdown.service_cost >= Decimal::ZERO);
        prop_assert!(breakdown.discount_total >= Decimal::ZERO);
        prop_assert!(breakdown.discount_total <= breakdown.service_cost);
        prop_assert!(breakdown.tax_total >= Decimal::ZERO);
        prop_assert!(breakdown.total_amount >= Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_arithmetic_invariants(
        plan_price in 0i64..=1_000_000,
        prices in prop::collection::vec(0i64..=100_000, 0..6),
        interval in interval_strategy(),
    ) {
        let (products, selected) = catalog_from(&prices);
        let plan = plan(plan_price, interval);
        let breakdown = PricingEngine::default()
            .compute_billing(&plan, &selected, &customer(), start(), &products, &[], &[])
            .unwrap();

        let base = (breakdown.service_cost - breakdown.discount_total).max(Decimal::ZERO);
        prop_assert_eq!(breakdown.total_amount, base + breakdown.tax_total);
        prop_assert_eq!(breakdown.remaining_balance, plan.price - base);
        prop_assert_eq!(
            breakdown.service_cost,
            breakdown.items.iter().map(|item| item.amount).sum::<Decimal>()
        );
    }

    #[test]
    fn test_identical_inputs_yield_identical_output(
        plan_price in 0i64..=1_000_000,
        prices in prop::collection::vec(0i64..=100_000, 0..6),
        interval in interval_strategy(),
        kind in kind_strategy(),
        value in 0i64..=20_000,
    ) {
        let (products, selected) = catalog_from(&prices);
        let rules = vec![discount("disc-1", kind, Decimal::new(value, 2), None)];
        let plan = plan(plan_price, interval);
        let engine = PricingEngine::default();

        let first = engine
            .compute_billing(&plan, &selected, &customer(), start(), &products, &rules, &[])
            .unwrap();
        let second = engine
            .compute_billing(&plan, &selected, &customer(), start(), &products, &rules, &[])
            .unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_exactly_one_rule_applies(
        prices in prop::collection::vec(1i64..=100_000, 1..6),
        specific_value in 0i64..=20_000,
        open_value in 1i64..=20_000,
    ) {
        // Two fixed-value rules in different tiers: only the
        // customer-scoped one may contribute, never the sum of both.
        let (products, selected) = catalog_from(&prices);
        let rules = vec![
            discount("disc-open", DiscountKind::Fixed, Decimal::new(open_value, 2), None),
            discount(
                "disc-mine",
                DiscountKind::Fixed,
                Decimal::new(specific_value, 2),
                Some(customer()),
            ),
        ];

        let breakdown = PricingEngine::default()
            .compute_billing(
                &plan(100_000, BillingInterval::Monthly),
                &selected,
                &customer(),
                start(),
                &products,
                &rules,
                &[],
            )
            .unwrap();

        let expected = Decimal::new(specific_value, 2).min(breakdown.service_cost);
        prop_assert_eq!(breakdown.discount_total, expected);
    }

    #[test]
    fn test_empty_selection_bills_nothing(
        plan_price in 0i64..=1_000_000,
        interval in interval_strategy(),
        kind in kind_strategy(),
        value in 0i64..=20_000,
        tax_pct in 0i64..=40,
    ) {
        let rules = vec![discount("disc-1", kind, Decimal::new(value, 2), None)];
        let taxes = vec![TaxRule {
            id: TaxRuleId::new("tax-1").unwrap(),
            name: "Levy".to_owned(),
            percentage: Decimal::new(tax_pct, 0),
            interval: IntervalScope::All,
            is_active: true,
        }];
        let plan = plan(plan_price, interval);

        let breakdown = PricingEngine::default()
            .compute_billing(&plan, &[], &customer(), start(), &[], &rules, &taxes)
            .unwrap();

        prop_assert_eq!(breakdown.service_cost, Decimal::ZERO);
        prop_assert_eq!(breakdown.discount_total, Decimal::ZERO);
        prop_assert_eq!(breakdown.tax_total, Decimal::ZERO);
        prop_assert_eq!(breakdown.total_amount, Decimal::ZERO);
        prop_assert_eq!(breakdown.remaining_balance, plan.price);
    }
}
