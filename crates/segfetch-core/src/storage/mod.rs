//! Destination file lifecycle and positioned writes.
//!
//! The destination is created (or truncated) at the start of a download with
//! owner-only permissions, optionally preallocated, and then filled in place
//! with offset writes (pwrite) so write order never affects file layout. A
//! failed download leaves the partial file where it is.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;
