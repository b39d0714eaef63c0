//! Test module for determinism, integration, and property tests.
//!
//! - `helpers.rs`: factories and fakes shared across suites
//! - `integration.rs`: end-to-end encounter scenarios
//! - `determinism.rs`: same seed, same inputs, identical outcomes
//! - `properties.rs`: proptest invariants for the numeric rules

mod helpers;

pub use helpers::*;
