//! Core types and trait definitions for the booth lead-collection backend.
//!
//! This crate is deliberately free of HTTP and storage dependencies. The
//! analytics (scan aggregation, reports, dashboard KPIs) are pure functions
//! over a [`record::Snapshot`], so they can be tested without a store.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dashboard;
pub mod error;
pub mod event;
pub mod export;
pub mod lead;
pub mod promo;
pub mod record;
pub mod report;
pub mod scans;
pub mod store;
pub mod wheel;

pub use error::{Error, FieldError, Result};
