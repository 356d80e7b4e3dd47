//! Shared low-level helpers for the metadata codecs

pub mod bytes;
pub mod math;
