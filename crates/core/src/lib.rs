//! `stockcurve-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and the numeric sanitizer every
//! catalog row goes through before it reaches the analytics.

pub mod error;
pub mod id;
pub mod sanitize;

pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use sanitize::{MAX_AMOUNT, parse_money, parse_stock, sanitize_amount, sanitize_quantity};
