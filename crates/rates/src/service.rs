//! # Rate Service
//!
//! Two-source failover for dollar quotes: the primary provider is tried
//! first, the backup next, and the build-time fallback table is the floor —
//! callers always get a board. A short-lived memo keeps bursts of UI
//! refreshes from hammering the providers.

use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::RateError;
use crate::providers::{bluelytics, dolarapi};
use crate::types::RateBoard;

const PRIMARY_URL: &str = "https://api.bluelytics.com.ar/v2/latest";
const BACKUP_URL: &str = "https://dolarapi.com/v1/dolares";
const MEMO_TTL: Duration = Duration::from_secs(5 * 60);

/// Dollar-quote client with failover and a request memo.
pub struct RateService {
    client: Client,
    primary_url: String,
    backup_url: String,
    memo_ttl: Duration,
    memo: Mutex<Option<(Instant, RateBoard)>>,
}

impl RateService {
    /// Build against the stock provider endpoints.
    pub fn new(client: Client) -> Self {
        Self::with_urls(client, PRIMARY_URL, BACKUP_URL)
    }

    /// Build against custom endpoints.
    pub fn with_urls(
        client: Client,
        primary_url: impl Into<String>,
        backup_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            primary_url: primary_url.into(),
            backup_url: backup_url.into(),
            memo_ttl: MEMO_TTL,
            memo: Mutex::new(None),
        }
    }

    /// The latest board: memo, then primary, then backup, then the fallback
    /// table. Never fails.
    pub async fn latest(&self) -> RateBoard {
        if let Some(board) = self.memoized() {
            return board;
        }

        let board = match self.fetch_primary().await {
            Ok(board) => board,
            Err(primary_error) => {
                warn!(error = %primary_error, "primary rate provider failed");
                match self.fetch_backup().await {
                    Ok(board) => board,
                    Err(backup_error) => {
                        warn!(error = %backup_error, "backup rate provider failed, using fallback table");
                        RateBoard::fallback(Utc::now())
                    }
                }
            }
        };

        *self.memo.lock() = Some((Instant::now(), board.clone()));
        board
    }

    /// Drop the memo and fetch again.
    pub async fn force_refresh(&self) -> RateBoard {
        *self.memo.lock() = None;
        self.latest().await
    }

    fn memoized(&self) -> Option<RateBoard> {
        let memo = self.memo.lock();
        match memo.as_ref() {
            Some((at, board)) if at.elapsed() < self.memo_ttl => Some(board.clone()),
            _ => None,
        }
    }

    async fn fetch_primary(&self) -> Result<RateBoard, RateError> {
        debug!(url = %self.primary_url, "fetching primary rates");
        let response = self.client.get(&self.primary_url).send().await?;
        if !response.status().is_success() {
            return Err(RateError::UpstreamStatus(response.status()));
        }

        let payload: bluelytics::BluelyticsResponse = response.json().await?;
        Ok(bluelytics::to_board(payload, Utc::now()))
    }

    async fn fetch_backup(&self) -> Result<RateBoard, RateError> {
        debug!(url = %self.backup_url, "fetching backup rates");
        let response = self.client.get(&self.backup_url).send().await?;
        if !response.status().is_success() {
            return Err(RateError::UpstreamStatus(response.status()));
        }

        let payload: Vec<dolarapi::DolarApiEntry> = response.json().await?;
        Ok(dolarapi::to_board(payload, Utc::now()))
    }
}
