//! Shared test support for the backend crate.
//!
//! Currently this only hosts the unified logging initializer used by both
//! unit tests and the integration suites.

pub mod logging;
