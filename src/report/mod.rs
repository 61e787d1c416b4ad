//!
//! Module for reporting
//!
//! Reporters are [EventListener](crate::plugins::EventListener)s. They print the plan of a run
//! when it starts and the measured result once it is done. Register one on the
//! [AggressorRunner::get_event_manager](crate::AggressorRunner::get_event_manager).
//!

/// Helper methods to format run results
pub mod format;
/// The json_reporter
mod json_reporter;
/// The plain_reporter
mod plain_reporter;

pub use json_reporter::{JsonReporter, JSON_REPORTER_NAME};
pub use plain_reporter::{PlainReporter, PLAIN_REPORTER_NAME};
