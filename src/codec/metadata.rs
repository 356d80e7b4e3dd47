//! Multi-record metadata container
//!
//! A metadata buffer starts with the 3-byte identifier `SPK` followed by one
//! or more records:
//!
//! ```text
//! SPK [len][tag][payload...] [len][tag][payload...] ... [tag][payload...]
//! ```
//!
//! A byte of at most 96 is a length prefix covering the tag and payload of
//! the record it introduces. A byte above 96 is the tag of the final record,
//! which runs to the end of the buffer.

use tracing::debug;

use crate::errors::{CodecError, CodecResult};
use crate::types::common::{LENGTH_PREFIX_MAX, METADATA_IDENTIFIER, METADATA_IDENTIFIER_LEN};

fn check_identifier(metadata: &[u8]) -> CodecResult<()> {
    if metadata.len() < METADATA_IDENTIFIER_LEN + 1 {
        return Err(CodecError::Truncated {
            expected: METADATA_IDENTIFIER_LEN + 1,
            actual: metadata.len(),
        });
    }

    if &metadata[..METADATA_IDENTIFIER_LEN] != METADATA_IDENTIFIER {
        return Err(CodecError::malformed("missing SPK identifier"));
    }

    Ok(())
}

/// One record found while walking a metadata buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordSpan {
    tag: u8,
    /// Offset of the length prefix, or of the tag for the final record
    start: usize,
    payload: (usize, usize),
}

/// Walk every record in `metadata`, validating length prefixes
fn scan_records(metadata: &[u8]) -> CodecResult<Vec<RecordSpan>> {
    check_identifier(metadata)?;

    let len = metadata.len();
    let mut position = METADATA_IDENTIFIER_LEN;
    let mut records = Vec::new();

    while position < len {
        let start = position;
        let found = metadata[position];
        position += 1;

        if found > LENGTH_PREFIX_MAX {
            records.push(RecordSpan {
                tag: found,
                start,
                payload: (position, len),
            });
            return Ok(records);
        }

        let record_len = usize::from(found);
        if position + record_len > len || position >= len {
            debug!(
                "Length prefix {} at offset {} overruns metadata of {} bytes",
                found, start, len
            );
            return Err(CodecError::Truncated {
                expected: position + record_len,
                actual: len,
            });
        }

        if record_len == 0 {
            return Err(CodecError::malformed(format!(
                "zero length prefix at offset {}",
                start
            )));
        }

        records.push(RecordSpan {
            tag: metadata[position],
            start,
            payload: (position + 1, position + record_len),
        });
        position += record_len;
    }

    Err(CodecError::malformed("metadata has no final record"))
}

/// Locate the payload of the record tagged `desired_tag`.
///
/// With `None` the final (unprefixed) record is returned whatever its tag.
/// A tag appearing more than once is rejected as ambiguous.
pub fn locate_range(metadata: &[u8], desired_tag: Option<u8>) -> CodecResult<&[u8]> {
    let records = scan_records(metadata)?;

    let span = match desired_tag {
        None => records.last().copied(),
        Some(tag) => {
            let mut matching = records.iter().filter(|r| r.tag == tag);
            let first = matching.next().copied();
            if first.is_some() && matching.next().is_some() {
                return Err(CodecError::AmbiguousTag(tag as char));
            }
            first
        }
    };

    match span {
        Some(span) => Ok(&metadata[span.payload.0..span.payload.1]),
        None => Err(CodecError::TagNotFound(
            desired_tag.map(char::from).unwrap_or('?'),
        )),
    }
}

/// Tags of every record in `metadata`, in buffer order
pub fn record_tags(metadata: &[u8]) -> CodecResult<Vec<u8>> {
    Ok(scan_records(metadata)?.iter().map(|r| r.tag).collect())
}

/// Space available for a further record appended with [`append`]
pub fn max_append_len(metadata: &[u8], metadata_max_len: usize) -> usize {
    metadata_max_len.saturating_sub((metadata.len() + 1).saturating_sub(METADATA_IDENTIFIER_LEN))
}

/// Append a separately encoded record to existing metadata.
///
/// The existing final record gains a length prefix and the new record's
/// `SPK` identifier is dropped, so the combined buffer keeps one identifier.
pub fn append(metadata: &[u8], metadata_max_len: usize, append_metadata: &[u8]) -> CodecResult<Vec<u8>> {
    let records = scan_records(metadata)?;
    let last = records
        .last()
        .copied()
        .ok_or_else(|| CodecError::malformed("metadata has no final record"))?;

    check_identifier(append_metadata)?;

    let needed = metadata.len() + append_metadata.len() - METADATA_IDENTIFIER_LEN + 1;
    if needed > metadata_max_len {
        return Err(CodecError::Capacity {
            needed,
            available: metadata_max_len,
        });
    }

    // tag plus payload of the final record
    let last_len = last.payload.1 - last.start;
    if last_len > usize::from(LENGTH_PREFIX_MAX) {
        return Err(CodecError::Capacity {
            needed: last_len,
            available: usize::from(LENGTH_PREFIX_MAX),
        });
    }

    let mut combined = Vec::with_capacity(needed);
    combined.extend_from_slice(&metadata[..last.start]);
    combined.push(last_len as u8);
    combined.extend_from_slice(&metadata[last.start..]);
    combined.extend_from_slice(&append_metadata[METADATA_IDENTIFIER_LEN..]);

    Ok(combined)
}
