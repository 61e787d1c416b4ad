//! Hardware counter collection with perf.
#[cfg(target_os = "linux")]
pub(crate) mod linux;

#[cfg(target_os = "linux")]
pub use linux::*;

#[cfg(not(target_os = "linux"))]
pub(crate) mod dummy;

#[cfg(not(target_os = "linux"))]
pub use dummy::*;

use crate::report::format::format_with_underscores;
use miniserde::Deserialize;
use miniserde::Serialize;

/// Name of the event listener
pub static PERF_CNT_EVENT_LISTENER_NAME: &str = "_aggressor_perf";

/// Hardware counter values of a single run.
///
/// ## Legend
/// - L1iM: L1 instruction cache read misses
/// - LLCM: last level cache read misses
/// - IRet: instructions retired
/// - Cycles: CPU cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterValues {
    /// L1 instruction cache read misses.
    pub l1i_miss_count: u64,
    /// Last level cache read misses.
    pub llc_miss_count: u64,
    /// Instructions retired.
    pub instructions: u64,
    /// CPU cycles.
    pub cpu_cycles: u64,
}

impl CounterValues {
    /// Formats the counters as `name: value` columns.
    pub fn to_columns(&self) -> Vec<String> {
        [
            ("L1iM", self.l1i_miss_count),
            ("LLCM", self.llc_miss_count),
            ("IRet", self.instructions),
            ("Cycles", self.cpu_cycles),
        ]
        .iter()
        .map(|(name, value)| format!("{}: {}", name, format_with_underscores(*value)))
        .collect()
    }

    /// Instructions per cycle, `None` if no cycles were counted.
    pub fn ipc(&self) -> Option<f64> {
        if self.cpu_cycles == 0 {
            return None;
        }
        Some(self.instructions as f64 / self.cpu_cycles as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns() {
        let values = CounterValues {
            l1i_miss_count: 1_234_567,
            llc_miss_count: 12,
            instructions: 4000,
            cpu_cycles: 2000,
        };
        assert_eq!(
            values.to_columns(),
            vec!["L1iM: 1_234_567", "LLCM: 12", "IRet: 4_000", "Cycles: 2_000"]
        );
        assert_eq!(values.ipc(), Some(2.0));
        assert_eq!(<CounterValues as Default>::default().ipc(), None);
    }

    #[test]
    fn json_round_trip() {
        let values = CounterValues {
            l1i_miss_count: 1,
            llc_miss_count: 2,
            instructions: 3,
            cpu_cycles: 4,
        };
        let json = miniserde::json::to_string(&values);
        let back: CounterValues = miniserde::json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
