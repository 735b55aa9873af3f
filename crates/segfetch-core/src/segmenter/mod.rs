//! Range math and segment planning.
//!
//! Splits a resource of known length into fixed-size inclusive byte ranges and
//! renders the HTTP `Range` header for each.

mod range;

pub use range::{plan_ranges, range_count, ByteRange, DEFAULT_PART_SIZE};
