//! # Client Gateway
//!
//! The worker never holds a registry of open pages itself; the host passes a
//! gateway in at construction and the worker talks to clients through it.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::message::ClientMessage;

/// Host-provided channel to connected client pages.
#[async_trait]
pub trait ClientGateway: Send + Sync {
    /// Deliver a message to every connected client page.
    async fn broadcast(&self, message: &ClientMessage);

    /// Take control of already-open client pages so they are served by this
    /// worker without a reload.
    async fn claim(&self);
}

/// Gateway for headless hosts: logs instead of delivering.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGateway;

#[async_trait]
impl ClientGateway for LogGateway {
    async fn broadcast(&self, message: &ClientMessage) {
        info!(message = ?message, "client broadcast");
    }

    async fn claim(&self) {
        debug!("claimed client pages");
    }
}
