//! CLI command handlers.

mod get;
mod probe;

pub use get::run_get;
pub use probe::run_probe;
