//! Message record: points recipients at content held on a delivery server
//!
//! A message is either public or addressed to one or more ranges of
//! transaction outputs. The hash identifies the content the server returns.

use serde::{Deserialize, Serialize};

use crate::codec::domain_path::DomainPath;
use crate::errors::{CodecError, CodecResult};
use crate::types::io_range::{normalize_ranges, IoRange};

pub const MESSAGE_SERVER_HOST_MAX_LEN: usize = 32;
pub const MESSAGE_SERVER_PATH_MAX_LEN: usize = 24;
pub const MESSAGE_HASH_MIN_LEN: usize = 12;
pub const MESSAGE_HASH_MAX_LEN: usize = 32;
pub const MESSAGE_MAX_IO_RANGES: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub use_https: bool,
    pub server_host: String,
    #[serde(default)]
    pub use_prefix: bool,
    #[serde(default)]
    pub server_path: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub output_ranges: Vec<IoRange>,
    /// Leading bytes of the message hash, 12 to 32 of them
    #[serde(with = "hex::serde")]
    pub hash: Vec<u8>,
}

impl MessageRecord {
    pub fn validate(&self) -> CodecResult<()> {
        if self.server_host.len() > MESSAGE_SERVER_HOST_MAX_LEN {
            return Err(CodecError::validation(format!(
                "server host longer than {} characters",
                MESSAGE_SERVER_HOST_MAX_LEN
            )));
        }

        if self.server_path.len() > MESSAGE_SERVER_PATH_MAX_LEN {
            return Err(CodecError::validation(format!(
                "server path longer than {} characters",
                MESSAGE_SERVER_PATH_MAX_LEN
            )));
        }

        if !(MESSAGE_HASH_MIN_LEN..=MESSAGE_HASH_MAX_LEN).contains(&self.hash.len()) {
            return Err(CodecError::validation(format!(
                "message hash length {} outside {}..={}",
                self.hash.len(),
                MESSAGE_HASH_MIN_LEN,
                MESSAGE_HASH_MAX_LEN
            )));
        }

        if !self.is_public && self.output_ranges.is_empty() {
            return Err(CodecError::validation(
                "message is neither public nor addressed to any output",
            ));
        }

        if self.output_ranges.len() > MESSAGE_MAX_IO_RANGES {
            return Err(CodecError::validation(format!(
                "{} output ranges, at most {} allowed",
                self.output_ranges.len(),
                MESSAGE_MAX_IO_RANGES
            )));
        }

        if let Some(range) = self.output_ranges.iter().find(|r| !r.is_valid()) {
            return Err(CodecError::validation(format!(
                "output range {}+{} out of bounds",
                range.first, range.count
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// True if the message can be read by the holder of `output_index`
    pub fn has_output(&self, output_index: usize) -> bool {
        self.is_public || self.output_ranges.iter().any(|r| r.contains(output_index))
    }

    /// Compare two records.
    ///
    /// Loose matching compares the output ranges after normalisation, so
    /// differently split ranges covering the same outputs are equal.
    pub fn matches(&self, other: &MessageRecord, strict: bool) -> bool {
        let hash_len = self
            .hash
            .len()
            .min(other.hash.len())
            .min(MESSAGE_HASH_MAX_LEN);

        let ranges_match = if strict {
            self.output_ranges == other.output_ranges
        } else {
            normalize_ranges(&self.output_ranges) == normalize_ranges(&other.output_ranges)
        };

        ranges_match
            && self.hash[..hash_len] == other.hash[..hash_len]
            && self.use_https == other.use_https
            && self.server_host.eq_ignore_ascii_case(&other.server_host)
            && self.use_prefix == other.use_prefix
            && self.server_path.eq_ignore_ascii_case(&other.server_path)
            && self.is_public == other.is_public
    }

    /// Delivery server location carried in the encoded record
    pub fn domain_path(&self) -> DomainPath {
        DomainPath::new(
            &self.server_host,
            &self.server_path,
            self.use_https,
            self.use_prefix,
        )
    }

    /// Base URL of the delivery server
    pub fn calc_server_url(&self) -> String {
        let url = format!(
            "{}://{}/{}{}{}",
            if self.use_https { "https" } else { "http" },
            self.server_host,
            if self.use_prefix { "coinspark/" } else { "" },
            self.server_path,
            if self.server_path.is_empty() { "" } else { "/" }
        );

        url.to_lowercase()
    }
}
