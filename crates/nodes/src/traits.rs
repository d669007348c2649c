//! `ActionSink` / `IntentSink` — the interface contracts external
//! Effect collaborators fulfil to consume what the core emits.
//!
//! The core (`engine::execute`, `registration::reduce`) never calls these
//! traits itself; it only produces the `Action`/`Intent` values they
//! accept. Actually dispatching to a sink — the transport, retries,
//! acking — is external (§1 Non-goals). These traits exist so a caller
//! can write one adapter per real downstream system (consul, postgres,
//! an event bus) against a stable shape, and so tests can substitute
//! [`crate::mock::MockSink`] for one.

use async_trait::async_trait;

use contract::{Action, Intent};

use crate::error::SinkError;

/// Consumes emitted `Action`s, one at a time, in the order the executor
/// produced them.
#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn accept(&self, action: &Action) -> Result<(), SinkError>;
}

/// Consumes emitted `Intent`s, one at a time, in the order the
/// registration reducer produced them.
#[async_trait]
pub trait IntentSink: Send + Sync {
    async fn accept(&self, intent: &Intent) -> Result<(), SinkError>;
}
