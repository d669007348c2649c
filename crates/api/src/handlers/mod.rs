//! HTTP handlers, one module per resource.

pub mod executions;
pub mod registrations;
pub mod workflows;
