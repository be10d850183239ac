//! # Portico Rates
//!
//! Dollar-quote client for the portico news portal. Quotes come from a
//! primary provider with automatic failover to a backup and, as the floor,
//! a static fallback table shipped with the build — the caller always gets
//! a full board.

pub mod error;
mod providers;
pub mod service;
pub mod types;

pub use error::RateError;
pub use service::RateService;
pub use types::{Quote, RateBoard, RateSource, SellingRates};
