//! Billing and subscription core for a salon management platform.
//!
//! This crate implements the money-handling heart of a salon/spa
//! application: the service catalog and rule store, a pure pricing engine,
//! the subscription lifecycle, invoice generation, and payment
//! reconciliation. The surrounding application — REST routing,
//! authentication, dashboards, messaging — sits above this crate and talks
//! to it through [`service::BillingService`] and the [`store`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │    CRUD / API layer          │  (out of scope)
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │       BillingService         │  create / confirm / close /
//! │                              │  record_payment / reports
//! │  ┌─────────────────────────┐ │
//! │  │      PricingEngine      │ │  pure computation
//! │  │  (rules + PricingConfig)│ │
//! │  └─────────────────────────┘ │
//! └──────────────┬───────────────┘
//!                │ store traits
//! ┌──────────────▼───────────────┐
//! │        Document store        │  plans, products, rules,
//! │  (InMemoryStore or your own) │  subscriptions, invoices, payments
//! └──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use rust_decimal::Decimal;
//! use salon_billing::{
//!     BillingService, NewSubscription,
//!     catalog::{
//!         BillingInterval, Customer, CustomerId, Plan, PlanId, PlanOptions, Product, ProductId,
//!         ProductKind,
//!     },
//!     payment::{NewPayment, PaymentMethod},
//!     store::InMemoryStore,
//! };
//!
//! # fn main() -> salon_billing::Result<()> {
//! let store = InMemoryStore::new();
//! store.insert_plan(Plan {
//!     id: PlanId::new("plan-gold")?,
//!     name: "Gold".to_owned(),
//!     price: Decimal::new(1000, 0),
//!     interval: BillingInterval::Monthly,
//!     services_included: vec![],
//!     options: PlanOptions::default(),
//!     active: true,
//! });
//! store.insert_product(Product {
//!     id: ProductId::new("svc-spa")?,
//!     name: "Spa".to_owned(),
//!     sales_price: Decimal::new(500, 0),
//!     category: "Wellness".to_owned(),
//!     kind: ProductKind::Service,
//!     active: true,
//! });
//! store.insert_customer(Customer {
//!     id: CustomerId::new("cust-1")?,
//!     name: "Asha".to_owned(),
//!     email: "asha@example.com".to_owned(),
//!     total_credits: 0,
//!     is_first_time: false,
//! });
//!
//! let service = BillingService::new(store);
//!
//! // Draft a subscription: one 500 spa service on a 1000/monthly plan.
//! // No discount rule is seeded, so the monthly fallback (100) applies,
//! // and the default 10% tax lands on the 400 base.
//! let subscription = service.create_subscription(NewSubscription {
//!     customer: CustomerId::new("cust-1")?,
//!     plan: PlanId::new("plan-gold")?,
//!     service_ids: vec![ProductId::new("svc-spa")?],
//!     start_date: Utc::now(),
//!     notes: None,
//! })?;
//!
//! // Confirmation generates the invoice as a snapshot of the subscription.
//! let (confirmed, invoice) = service.confirm_subscription(&subscription.id)?;
//! assert_eq!(invoice.total, Decimal::new(440, 0));
//!
//! // A full payment settles the invoice and activates the subscription.
//! let outcome = service.record_payment(NewPayment {
//!     invoice: invoice.id,
//!     customer: confirmed.customer.clone(),
//!     amount: invoice.total,
//!     method: PaymentMethod::Card,
//!     paid_at: None,
//! })?;
//! assert!(outcome.subscription_activated);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`catalog`]: plans, products, discount and tax rules, customers
//! - [`pricing`]: the pure pricing engine, rule resolution, configuration
//! - [`subscription`]: subscription documents and lifecycle states
//! - [`invoice`]: invoice documents generated at confirmation
//! - [`payment`]: append-only payment records and reconciliation outcomes
//! - [`store`]: store traits and the in-memory document store
//! - [`service`]: the operation surface exposed to the CRUD/API layer
//! - [`reports`]: customer and admin dashboard summaries
//! - [`error`]: error taxonomy
//!
//! # Consistency Model
//!
//! Every operation is synchronous, request-per-call. Multi-document
//! updates (confirm writes the subscription, the customer, and the
//! invoice; reconciliation writes the payment, the invoice, and possibly
//! the subscription) are sequential independent writes with no
//! transactional atomicity. A store implementation backed by a
//! transactional engine MAY wrap the confirm sequence in a transaction
//! without changing the observable contract.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod invoice;
pub mod payment;
pub mod pricing;
pub mod reports;
pub mod service;
pub mod store;
pub mod subscription;

pub use error::{BillingError, Result};
pub use pricing::{BillingBreakdown, PricingConfig, PricingEngine};
pub use service::{BillingService, NewSubscription};
