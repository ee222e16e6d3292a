//! Error types for the billing core.
//!
//! This module defines all error types that can occur during billing,
//! lifecycle, and reconciliation operations. All errors implement the
//! standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Plan reference errors** ([`BillingError::InvalidPlan`]): a malformed
//!   or unresolvable plan reference reached the pricing engine
//! - **Lookup errors** ([`BillingError::NotFound`]): a referenced entity is
//!   absent from the store
//! - **Validation errors** ([`BillingError::Validation`]): a required
//!   computation input is missing or malformed, or a state transition is
//!   not allowed
//!
//! These are administrative CRUD operations, not resilient infrastructure:
//! errors propagate upward uncaught, with no retries and no partial
//! recovery. Missing discount or tax rule sets are *not* errors — the
//! pricing engine falls back to its configured defaults instead.
//!
//! # Examples
//!
//! ```
//! use salon_billing::error::{BillingError, Result};
//!
//! fn quantity_of(raw: i64) -> Result<u32> {
//!     u32::try_from(raw)
//!         .map_err(|_| BillingError::Validation("quantity must be non-negative".to_string()))
//! }
//!
//! assert!(quantity_of(-1).is_err());
//! ```

use thiserror::Error;

/// Result type alias for billing operations.
///
/// This is a convenience type that uses [`BillingError`] as the error type.
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors that can occur in the billing core.
///
/// All variants carry a human-readable description of what went wrong. The
/// calling layer is expected to surface a generic failure message; no
/// domain-specific recovery flow is required.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BillingError {
    /// The plan reference is malformed or does not resolve to a plan.
    ///
    /// Raised by the pricing engine and the subscription lifecycle when a
    /// billing computation is requested against a plan the rule store does
    /// not know about.
    #[error("invalid plan reference: {0}")]
    InvalidPlan(String),

    /// A referenced entity is absent from the store.
    ///
    /// Raised when an operation names a subscription, invoice, customer, or
    /// product that does not exist. Posting a payment against a missing
    /// invoice surfaces this error; the payment record itself has already
    /// been appended by that point (sequential writes, no atomicity).
    #[error("not found: {0}")]
    NotFound(String),

    /// A required computation input is missing or malformed, or the
    /// requested state transition is not allowed.
    ///
    /// Covers negative monetary inputs, malformed identifiers, and
    /// transitions out of a terminal subscription state.
    #[error("validation failed: {0}")]
    Validation(String),
}
