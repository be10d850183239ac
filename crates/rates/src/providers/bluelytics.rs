//! Bluelytics (primary provider) payload mapping.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Quote, RateBoard, RateSource, fallback, variation};

#[derive(Debug, Deserialize)]
pub(crate) struct BluelyticsResponse {
    pub oficial: Option<BluelyticsPair>,
    pub blue: Option<BluelyticsPair>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BluelyticsPair {
    pub value_buy: Option<f64>,
    pub value_sell: Option<f64>,
}

/// Map the primary payload onto a full board. Bluelytics does not cover MEP
/// or CCL; those quotes come from the fallback table.
pub(crate) fn to_board(payload: BluelyticsResponse, now: DateTime<Utc>) -> RateBoard {
    RateBoard {
        oficial: pair_to_quote(payload.oficial, fallback::OFICIAL, now),
        blue: pair_to_quote(payload.blue, fallback::BLUE, now),
        mep: Quote::from_fallback(fallback::MEP, now),
        ccl: Quote::from_fallback(fallback::CCL, now),
        last_update: now,
        source: RateSource::Bluelytics,
    }
}

fn pair_to_quote(
    pair: Option<BluelyticsPair>,
    (fallback_buy, fallback_sell): (f64, f64),
    now: DateTime<Utc>,
) -> Quote {
    let buy = pair
        .as_ref()
        .and_then(|p| p.value_buy)
        .unwrap_or(fallback_buy);
    let sell = pair
        .as_ref()
        .and_then(|p| p.value_sell)
        .unwrap_or(fallback_sell);

    Quote {
        buy,
        sell,
        variation: variation(sell, fallback_sell),
        date: now,
    }
}
