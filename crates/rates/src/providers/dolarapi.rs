//! DolarApi (backup provider) payload mapping.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Quote, RateBoard, RateSource, fallback, variation};

#[derive(Debug, Deserialize)]
pub(crate) struct DolarApiEntry {
    pub casa: String,
    pub compra: Option<f64>,
    pub venta: Option<f64>,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Map the backup payload onto a full board. Quote kinds the payload does
/// not carry come from the fallback table.
pub(crate) fn to_board(entries: Vec<DolarApiEntry>, now: DateTime<Utc>) -> RateBoard {
    let mut oficial = None;
    let mut blue = None;
    let mut mep = None;
    let mut ccl = None;

    for entry in entries {
        match entry.casa.as_str() {
            "oficial" => oficial = Some(entry_to_quote(entry, fallback::OFICIAL, now)),
            "blue" => blue = Some(entry_to_quote(entry, fallback::BLUE, now)),
            "bolsa" => mep = Some(entry_to_quote(entry, fallback::MEP, now)),
            "contadoconliqui" => ccl = Some(entry_to_quote(entry, fallback::CCL, now)),
            _ => {}
        }
    }

    RateBoard {
        oficial: oficial.unwrap_or_else(|| Quote::from_fallback(fallback::OFICIAL, now)),
        blue: blue.unwrap_or_else(|| Quote::from_fallback(fallback::BLUE, now)),
        mep: mep.unwrap_or_else(|| Quote::from_fallback(fallback::MEP, now)),
        ccl: ccl.unwrap_or_else(|| Quote::from_fallback(fallback::CCL, now)),
        last_update: now,
        source: RateSource::Dolarapi,
    }
}

fn entry_to_quote(
    entry: DolarApiEntry,
    (fallback_buy, fallback_sell): (f64, f64),
    now: DateTime<Utc>,
) -> Quote {
    let buy = entry.compra.unwrap_or(fallback_buy);
    let sell = entry.venta.unwrap_or(fallback_sell);

    Quote {
        buy,
        sell,
        variation: variation(sell, fallback_sell),
        date: entry.updated_at.unwrap_or(now),
    }
}
