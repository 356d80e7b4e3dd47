//! Codec Unit Tests
//!
//! Genesis, transfer list, payment reference and message records, and the
//! metadata container that holds them.

pub mod container;
pub mod genesis;
pub mod transfers;
