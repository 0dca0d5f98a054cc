//! Integration test utilities for the presence bridge
//!
//! This crate provides helpers for running end-to-end tests against the PBX
//! app service with in-memory identity lookups.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
