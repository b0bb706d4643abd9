//! Observability infrastructure.
//!
//! Provides structured tracing setup for the worker and for tests.

pub mod tracing;
