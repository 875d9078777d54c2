//! Data adapters for the Vicinity engine.
//!
//! The [`locationiq`] module implements the core provider traits over the
//! LocationIQ autocomplete, nearby and directions APIs.
#![forbid(unsafe_code)]

pub mod locationiq;
