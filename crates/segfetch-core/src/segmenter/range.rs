//! Byte range type and fixed-size range planning.

use std::fmt;

/// Default part size: 4 MiB.
pub const DEFAULT_PART_SIZE: u64 = 4 * 1024 * 1024;

/// An inclusive byte range `[start, end]` of the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Panics if `end < start`; a range always covers at least one byte.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(end >= start, "byte range end {} before start {}", end, start);
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end`.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Number of ranges `plan_ranges(total, part_size)` would produce, without
/// building them.
pub fn range_count(total: u64, part_size: u64) -> u64 {
    if total == 0 || part_size == 0 {
        return 0;
    }
    total.div_ceil(part_size)
}

/// Plans consecutive ranges of `part_size` bytes covering `[0, total)`.
///
/// The last range is clipped to end at `total - 1`. Returns an empty vec if
/// `total` or `part_size` is 0. Identical inputs always give identical output,
/// which is what lets retries reuse exact bounds.
pub fn plan_ranges(total: u64, part_size: u64) -> Vec<ByteRange> {
    if total == 0 || part_size == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(range_count(total, part_size) as usize);
    let mut start = 0u64;
    while start < total {
        let end = start.saturating_add(part_size - 1).min(total - 1);
        out.push(ByteRange { start, end });
        start = end + 1;
    }
    out
}
