//! Store boundary for the billing core.
//!
//! One trait per concern decouples the core from any specific document
//! store; implement them over MongoDB, SQLite, or whatever backs the
//! deployment. [`InMemoryStore`] implements all of them over hash maps and
//! serves as the default backend and the test double.
//!
//! All operations are synchronous and independent. Multi-document updates
//! (confirm, reconcile) are sequential writes with no transactional
//! atomicity; a crash between steps leaves partial state.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    catalog::{Customer, CustomerId, DiscountRule, Plan, PlanId, Product, ProductId, TaxRule},
    error::Result,
    invoice::{Invoice, InvoiceId},
    payment::Payment,
    subscription::{Subscription, SubscriptionId},
};

/// Read-only lookup of plans, products, discount rules, and tax rules.
pub trait RuleStore {
    /// Fetches a plan by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails; an absent plan is
    /// `Ok(None)`, not an error.
    fn plan(&self, id: &PlanId) -> Result<Option<Plan>>;

    /// Fetches the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn products(&self) -> Result<Vec<Product>>;

    /// Fetches all discount rules, in stable precedence-breaking order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn discount_rules(&self) -> Result<Vec<DiscountRule>>;

    /// Fetches all tax rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn tax_rules(&self) -> Result<Vec<TaxRule>>;
}

/// Customer profile access.
pub trait CustomerStore {
    /// Fetches a customer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn customer(&self, id: &CustomerId) -> Result<Option<Customer>>;

    /// Replaces the stored customer document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn update_customer(&self, customer: &Customer) -> Result<()>;

    /// Fetches all customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn customers(&self) -> Result<Vec<Customer>>;
}

/// Subscription document access.
pub trait SubscriptionStore {
    /// Persists a new subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn insert_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Fetches a subscription by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn subscription(&self, id: &SubscriptionId) -> Result<Option<Subscription>>;

    /// Replaces the stored subscription document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn update_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Fetches all subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn subscriptions(&self) -> Result<Vec<Subscription>>;

    /// Returns the next value of the subscription number sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn next_subscription_seq(&self) -> Result<u64>;
}

/// Invoice document access.
pub trait InvoiceStore {
    /// Persists a new invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn insert_invoice(&self, invoice: &Invoice) -> Result<()>;

    /// Fetches an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>>;

    /// Replaces the stored invoice document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn update_invoice(&self, invoice: &Invoice) -> Result<()>;

    /// Returns the next value of the invoice number sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn next_invoice_seq(&self) -> Result<u64>;
}

/// Append-only payment records.
pub trait PaymentStore {
    /// Appends a payment record. Payments are never mutated afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn append_payment(&self, payment: &Payment) -> Result<()>;

    /// Fetches all payment records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn payments(&self) -> Result<Vec<Payment>>;
}

/// Everything the billing service needs from a backend.
pub trait Store:
    RuleStore + CustomerStore + SubscriptionStore + InvoiceStore + PaymentStore
{
}

impl<T> Store for T where
    T: RuleStore + CustomerStore + SubscriptionStore + InvoiceStore + PaymentStore
{
}

/// In-memory document store.
///
/// The default backend for examples and tests. Rule collections keep
/// insertion order, so within a resolution tier the earliest-seeded rule
/// wins ties deterministically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    plans: HashMap<PlanId, Plan>,
    products: Vec<Product>,
    discounts: Vec<DiscountRule>,
    taxes: Vec<TaxRule>,
    customers: HashMap<CustomerId, Customer>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    invoices: HashMap<InvoiceId, Invoice>,
    payments: Vec<Payment>,
    subscription_seq: u64,
    invoice_seq: u64,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a plan into the catalog.
    pub fn insert_plan(&self, plan: Plan) {
        self.lock().plans.insert(plan.id.clone(), plan);
    }

    /// Seeds a product into the catalog.
    pub fn insert_product(&self, product: Product) {
        let mut inner = self.lock();
        inner.products.retain(|existing| existing.id != product.id);
        inner.products.push(product);
    }

    /// Seeds a discount rule.
    pub fn insert_discount_rule(&self, rule: DiscountRule) {
        self.lock().discounts.push(rule);
    }

    /// Seeds a tax rule.
    pub fn insert_tax_rule(&self, rule: TaxRule) {
        self.lock().taxes.push(rule);
    }

    /// Seeds a customer account.
    pub fn insert_customer(&self, customer: Customer) {
        self.lock().customers.insert(customer.id.clone(), customer);
    }
}

impl RuleStore for InMemoryStore {
    fn plan(&self, id: &PlanId) -> Result<Option<Plan>> {
        Ok(self.lock().plans.get(id).cloned())
    }

    fn products(&self) -> Result<Vec<Product>> {
        Ok(self.lock().products.clone())
    }

    fn discount_rules(&self) -> Result<Vec<DiscountRule>> {
        Ok(self.lock().discounts.clone())
    }

    fn tax_rules(&self) -> Result<Vec<TaxRule>> {
        Ok(self.lock().taxes.clone())
    }
}

impl CustomerStore for InMemoryStore {
    fn customer(&self, id: &CustomerId) -> Result<Option<Customer>> {
        Ok(self.lock().customers.get(id).cloned())
    }

    fn update_customer(&self, customer: &Customer) -> Result<()> {
        self.lock().customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    fn customers(&self) -> Result<Vec<Customer>> {
        Ok(self.lock().customers.values().cloned().collect())
    }
}

impl SubscriptionStore for InMemoryStore {
    fn insert_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.lock().subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    fn subscription(&self, id: &SubscriptionId) -> Result<Option<Subscription>> {
        Ok(self.lock().subscriptions.get(id).cloned())
    }

    fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.lock().subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    fn subscriptions(&self) -> Result<Vec<Subscription>> {
        Ok(self.lock().subscriptions.values().cloned().collect())
    }

    fn next_subscription_seq(&self) -> Result<u64> {
        let mut inner = self.lock();
        inner.subscription_seq += 1;
        Ok(inner.subscription_seq)
    }
}

impl InvoiceStore for InMemoryStore {
    fn insert_invoice(&self, invoice: &Invoice) -> Result<()> {
        self.lock().invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    fn invoice(&self, id: &InvoiceId) -> Result<Option<Invoice>> {
        Ok(self.lock().invoices.get(id).cloned())
    }

    fn update_invoice(&self, invoice: &Invoice) -> Result<()> {
        self.lock().invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    fn next_invoice_seq(&self) -> Result<u64> {
        let mut inner = self.lock();
        inner.invoice_seq += 1;
        Ok(inner.invoice_seq)
    }
}

impl PaymentStore for InMemoryStore {
    fn append_payment(&self, payment: &Payment) -> Result<()> {
        self.lock().payments.push(payment.clone());
        Ok(())
    }

    fn payments(&self) -> Result<Vec<Payment>> {
        Ok(self.lock().payments.clone())
    }
}
