//! Ambient plumbing shared by Folio binaries.
//!
//! Configuration loading, tracing setup, request ids, liveness and
//! serialization helpers. Nothing in here knows about login codes or mail.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
