//! Catalog domain module.
//!
//! This crate holds the product record the analytics operate on, the ABC
//! curve label, and the ingestion row types, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{Curve, CurveUpdate, NewProduct, Product, RawProductRow};
