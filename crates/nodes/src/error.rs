//! Error type returned by a collaborator sinking an `Action` or `Intent`.

use thiserror::Error;

/// Errors a downstream collaborator may report back to whatever drives it.
///
/// Splits retryable from fatal so a caller can decide retry behaviour
/// without string-matching a message. The core itself never inspects
/// these — running an `Action` is an external Effect concern (§1
/// Non-goals) — but the distinction is part of the interface contract
/// external collaborators are expected to honor.
#[derive(Debug, Error, Clone)]
pub enum SinkError {
    #[error("retryable sink error: {0}")]
    Retryable(String),

    #[error("fatal sink error: {0}")]
    Fatal(String),
}
