use std::any::Any;

use crate::plugins::{AggressorEvents, EventListener};
use crate::runner::RunReport;

/// Name of the json reporter listener.
pub static JSON_REPORTER_NAME: &str = "_aggressor_json_reporter";

/// Prints each finished run as a single line of JSON.
///
/// Nothing is printed before the run starts, so unbounded runs produce no output.
#[derive(Clone, Copy, Default)]
pub struct JsonReporter {}

impl JsonReporter {
    /// Create a new JsonReporter
    pub fn new() -> Self {
        Self {}
    }

    /// The JSON line for a report.
    pub fn to_line(report: &RunReport) -> String {
        miniserde::json::to_string(report)
    }
}

impl EventListener for JsonReporter {
    fn name(&self) -> &'static str {
        JSON_REPORTER_NAME
    }
    fn on_event(&mut self, event: AggressorEvents) {
        if let AggressorEvents::Report(report) = event {
            println!("{}", Self::to_line(report));
        }
    }
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
}
