use serde::{Deserialize, Serialize};

use super::common::IO_INDEX_MAX;

/// Contiguous slice of transaction inputs or outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IoRange {
    pub first: u32,
    pub count: u32,
}

impl IoRange {
    pub fn new(first: u32, count: u32) -> Self {
        Self { first, count }
    }

    /// A single index
    pub fn single(index: u32) -> Self {
        Self::new(index, 1)
    }

    pub fn is_valid(&self) -> bool {
        self.first <= IO_INDEX_MAX && self.count <= IO_INDEX_MAX
    }

    /// One past the last index covered
    pub fn end(&self) -> u64 {
        u64::from(self.first) + u64::from(self.count)
    }

    pub fn contains(&self, index: usize) -> bool {
        (index as u64) >= u64::from(self.first) && (index as u64) < self.end()
    }

    /// Indices of this range that exist among `count_io` inputs or outputs
    pub fn clipped(&self, count_io: usize) -> std::ops::Range<usize> {
        let first = self.first as usize;
        let end = (self.end() as usize).min(count_io);
        first..end.max(first)
    }
}

/// Sort ranges by first index and merge any that overlap or touch
pub fn normalize_ranges(ranges: &[IoRange]) -> Vec<IoRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|r| (r.first, r.count));

    let mut merged: Vec<IoRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if u64::from(range.first) <= last.end() => {
                let end = last.end().max(range.end());
                last.count = (end - u64::from(last.first)) as u32;
            }
            _ => merged.push(range),
        }
    }

    merged
}
