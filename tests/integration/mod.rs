//! Integration Tests Module
//!
//! End-to-end tests that follow asset quantities through genesis and
//! spending transactions, drive the CLI commands, and check codec
//! properties over generated records.

pub mod properties;
pub mod transaction_flow;
