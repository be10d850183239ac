//! # Host Message Protocol
//!
//! The wire shapes exchanged with the host page. Inbound control messages
//! arrive tagged by `type`; replies are plain objects returned to the
//! posting client.

use serde::{Deserialize, Serialize};

/// Control messages the host page posts to the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Promote an installed-and-waiting worker without waiting for every
    /// client page to close.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,

    /// Ask which version is serving.
    #[serde(rename = "GET_VERSION")]
    GetVersion,

    /// Wipe every cache partition.
    #[serde(rename = "CLEAR_CACHE")]
    ClearCache,

    /// Refetch the given URLs into the static partition, bypassing caches.
    #[serde(rename = "FORCE_UPDATE")]
    ForceUpdate { urls: Vec<String> },
}

/// Replies to control messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageReply {
    Version { version: String },
    Completed { success: bool },
}

/// Messages the worker broadcasts to connected client pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A newer version finished installing and is waiting to activate.
    #[serde(rename = "UPDATE_AVAILABLE")]
    UpdateAvailable { version: String },
}
