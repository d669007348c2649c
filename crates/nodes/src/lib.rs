//! `nodes` crate — the interface contracts ([`ActionSink`], [`IntentSink`])
//! that downstream Effect collaborators implement to consume what the
//! core emits, plus the [`NodeKind`] taxonomy the core tags its output
//! with.
//!
//! Nothing here executes an `Action` or drives an `Intent` to completion —
//! that dispatch is external (Non-goal). A [`mock::MockSink`] test double
//! is provided for exercising callers of these traits without a real
//! downstream system.

pub mod emit;
pub mod error;
pub mod kind;
pub mod mock;
pub mod traits;

pub use emit::{append_actions, append_intents};
pub use error::SinkError;
pub use kind::NodeKind;
pub use mock::{MockBehaviour, MockSink};
pub use traits::{ActionSink, IntentSink};
