use super::{CounterValues, PERF_CNT_EVENT_LISTENER_NAME};
use crate::plugins::*;
use std::any::Any;

///
/// Perf Counter Plugin.
///
/// Hardware counters are only supported on Linux, this plugin never reports values.
#[derive(Default)]
#[allow(missing_copy_implementations)]
pub struct PerfCounterPlugin {}

impl PerfCounterPlugin {
    /// Always `None` on this platform.
    pub fn take_values(&mut self) -> Option<CounterValues> {
        None
    }
}

impl EventListener for PerfCounterPlugin {
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        PERF_CNT_EVENT_LISTENER_NAME
    }
    fn on_event(&mut self, _event: AggressorEvents) {}
}
