//! # Rate Providers
//!
//! Response mappings for the two quote providers. Each maps its payload
//! shape onto a full [`crate::RateBoard`], filling uncovered quote kinds
//! from the fallback table.

pub(crate) mod bluelytics;
pub(crate) mod dolarapi;
