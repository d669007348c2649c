//! `MockSink` — a test double implementing both [`ActionSink`] and
//! [`IntentSink`].
//!
//! Useful in unit and integration tests where a real downstream
//! collaborator (consul, postgres, an event bus) is either unavailable or
//! irrelevant to what's being tested.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use contract::{Action, Intent};

use crate::error::SinkError;
use crate::traits::{ActionSink, IntentSink};

/// Behaviour injected into `MockSink` at construction time.
pub enum MockBehaviour {
    /// Accept the call and succeed.
    Accept,
    /// Fail with a `Retryable` error.
    FailRetryable(String),
    /// Fail with a `Fatal` error.
    FailFatal(String),
}

/// A mock sink that records every `Action`/`Intent` it receives (as raw
/// JSON, so one type can record both) and returns a programmer-specified
/// result.
pub struct MockSink {
    /// Label used in test assertions.
    pub name: String,
    /// What the sink will do when `accept` is called.
    pub behaviour: MockBehaviour,
    /// All values seen by this sink (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockSink {
    /// Create a sink that always accepts.
    pub fn accepting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::Accept,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a sink that always fails with a `Fatal` error.
    pub fn failing_fatal(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailFatal(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a sink that always fails with a `Retryable` error.
    pub fn failing_retryable(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: MockBehaviour::FailRetryable(msg.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of times this sink has been called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record_and_resolve(&self, value: Value) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(value);

        match &self.behaviour {
            MockBehaviour::Accept => Ok(()),
            MockBehaviour::FailRetryable(msg) => Err(SinkError::Retryable(msg.clone())),
            MockBehaviour::FailFatal(msg) => Err(SinkError::Fatal(msg.clone())),
        }
    }
}

#[async_trait]
impl ActionSink for MockSink {
    async fn accept(&self, action: &Action) -> Result<(), SinkError> {
        let value = serde_json::to_value(action)
            .unwrap_or_else(|_| serde_json::json!({ "node": self.name }));
        self.record_and_resolve(value)
    }
}

#[async_trait]
impl IntentSink for MockSink {
    async fn accept(&self, intent: &Intent) -> Result<(), SinkError> {
        let value = serde_json::to_value(intent)
            .unwrap_or_else(|_| serde_json::json!({ "node": self.name }));
        self.record_and_resolve(value)
    }
}
