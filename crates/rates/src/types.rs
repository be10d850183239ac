//! # Rate Types
//!
//! The board of dollar quotes the portal renders, and the build-time
//! fallback table used when every provider is unreachable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source produced a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Bluelytics,
    Dolarapi,
    Fallback,
}

/// One buy/sell quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub buy: f64,
    pub sell: f64,
    /// Percent change of the sell price against the fallback reference.
    pub variation: f64,
    pub date: DateTime<Utc>,
}

impl Quote {
    /// A quote taken straight from the fallback table: zero variation.
    pub(crate) fn from_fallback((buy, sell): (f64, f64), date: DateTime<Utc>) -> Self {
        Self {
            buy,
            sell,
            variation: 0.0,
            date,
        }
    }
}

/// The four quote kinds the portal shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBoard {
    pub oficial: Quote,
    pub blue: Quote,
    pub mep: Quote,
    pub ccl: Quote,
    pub last_update: DateTime<Utc>,
    pub source: RateSource,
}

/// Sell prices only, the figures most of the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellingRates {
    pub oficial: f64,
    pub blue: f64,
    pub mep: f64,
    pub ccl: f64,
    pub last_update: DateTime<Utc>,
    pub source: RateSource,
}

impl RateBoard {
    /// The static fallback board shipped with the build.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            oficial: Quote::from_fallback(fallback::OFICIAL, now),
            blue: Quote::from_fallback(fallback::BLUE, now),
            mep: Quote::from_fallback(fallback::MEP, now),
            ccl: Quote::from_fallback(fallback::CCL, now),
            last_update: now,
            source: RateSource::Fallback,
        }
    }

    pub fn selling_rates(&self) -> SellingRates {
        SellingRates {
            oficial: self.oficial.sell,
            blue: self.blue.sell,
            mep: self.mep.sell,
            ccl: self.ccl.sell,
            last_update: self.last_update,
            source: self.source,
        }
    }
}

/// Last known quotes at build time, `(buy, sell)` in ARS.
pub(crate) mod fallback {
    pub const OFICIAL: (f64, f64) = (1320.0, 1326.0);
    pub const BLUE: (f64, f64) = (1435.0, 1440.0);
    pub const MEP: (f64, f64) = (1418.0, 1423.0);
    pub const CCL: (f64, f64) = (1457.0, 1462.0);
}

/// Percent change of `current` against `reference`.
pub(crate) fn variation(current: f64, reference: f64) -> f64 {
    if current == 0.0 || reference == 0.0 {
        return 0.0;
    }
    (current - reference) / reference * 100.0
}
