//! Session activity statistics.

pub mod log;

pub use log::{create_shared_log, ActivityLog, ActivityStats, SharedActivityLog};
