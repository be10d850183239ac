//! # Portico Offline
//!
//! Client-side offline caching engine for the portico news portal.
//! Intercepted requests are classified, routed through per-class caching
//! strategies over versioned cache partitions, and always resolve to a
//! response, network or not.
//!
//! ## Features
//!
//! - Resource classification (static shell, api data, binary assets, generic)
//! - Cache-first, network-first, and stale-revalidation strategies
//! - Versioned partitions with install/activate lifecycle and update handoff
//! - Bounded dynamic cache with FIFO eviction
//! - Deterministic offline fallbacks, host message protocol, background resync

pub mod builder;
pub mod classify;
pub mod clients;
pub mod config;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod maintenance;
pub mod message;
pub mod request;
pub mod store;
pub mod strategy;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::WorkerConfigBuilder;
pub use classify::{Classifier, ResourceClass};
pub use clients::{ClientGateway, LogGateway};
pub use config::{EntryLimits, MaxAgePolicy, WorkerConfig};
pub use error::FetchError;
pub use fetch::{Fetcher, HttpFetcher, create_client};
pub use lifecycle::{LifecycleController, WorkerState};
pub use message::{ClientMessage, ControlMessage, MessageReply};
pub use request::{RequestMode, ServedFrom, WebRequest, WebResponse};
pub use store::{
    CacheEntry, CacheKey, CacheStore, DiskStore, EntryMetadata, MemoryStore, StoreProvider,
    StoreResult,
};
pub use strategy::StrategyRouter;
pub use worker::OfflineWorker;
