//! Unit Tests Module
//!
//! Checks of individual codecs and calculations against reference
//! metadata produced by the CoinSpark libraries.

pub mod codec;
