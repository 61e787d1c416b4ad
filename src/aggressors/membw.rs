use std::time::Duration;

use crate::{
    buffer::{CacheLineBuffer, CACHE_LINE_SIZE, LINES_PER_STEP},
    error::{Error, Result},
    runner::{AggressorRunner, Measurement, RunPlan, RunReport},
};

use super::duration_from_secs;

/// Default buffer size, far larger than any last level cache.
pub const DEFAULT_MEMBW_BUFFER_BYTES: usize = 1 << 30;

/// Smallest buffer holding one full step of strided loads.
pub const MIN_MEMBW_BUFFER_BYTES: usize = LINES_PER_STEP * CACHE_LINE_SIZE;

/// Saturates memory bandwidth by streaming strided loads over a large buffer.
///
/// Every load touches a different cache line, eight independent lines per step, so nearly every
/// load has to go to memory once the buffer exceeds the caches.
pub struct MemBwAggressor {
    duration: Duration,
    buffer: CacheLineBuffer,
    cpu_mhz: Option<f64>,
    warmed_up: bool,
}

impl MemBwAggressor {
    /// Creates an aggressor working on a buffer of `buffer_bytes`.
    ///
    /// `cpu_mhz` enables reporting the reciprocal throughput in cycles per load. Buffers smaller
    /// than [MIN_MEMBW_BUFFER_BYTES] are rejected, a pass over them would not issue a single load.
    pub fn new(duration_secs: f64, buffer_bytes: usize, cpu_mhz: Option<f64>) -> Result<Self> {
        let duration = duration_from_secs(duration_secs)?;
        if buffer_bytes < MIN_MEMBW_BUFFER_BYTES {
            return Err(Error::InvalidBufferSize(buffer_bytes, MIN_MEMBW_BUFFER_BYTES));
        }
        if let Some(mhz) = cpu_mhz {
            if mhz.is_nan() || mhz <= 0.0 || mhz.is_infinite() {
                return Err(Error::InvalidFrequency(mhz));
            }
        }
        Ok(MemBwAggressor {
            duration,
            buffer: CacheLineBuffer::new(buffer_bytes),
            cpu_mhz,
            warmed_up: false,
        })
    }

    /// Writes to every word of the buffer so no page fault hits the measurement.
    ///
    /// Called by [Self::run] if it has not been called before.
    pub fn warm_up(&mut self) {
        self.buffer.fill_with_indices();
        self.warmed_up = true;
        log::debug!("warmed up {} bytes", self.buffer.size_in_bytes());
    }

    /// The plan emitted before the run starts.
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            unit: "loads",
            duration: Some(self.duration),
            buffer_bytes: Some(self.buffer.size_in_bytes()),
            bytes_per_op: Some(CACHE_LINE_SIZE as u64),
            cpu_mhz: self.cpu_mhz,
            ..RunPlan::new("membw")
        }
    }

    /// Streams over the buffer in full passes until the duration has elapsed.
    pub fn run(&mut self, runner: &mut AggressorRunner) -> RunReport {
        if !self.warmed_up {
            self.warm_up();
        }
        let plan = self.plan();
        let duration = self.duration;
        let buffer = &self.buffer;
        runner.execute(&plan, |clock| {
            let mut loads = 0u64;
            let mut passes = 0u64;
            let start = clock.now();
            while clock.elapsed_since(&start) < duration {
                loads += buffer.load_lines_strided();
                passes += 1;
            }
            let elapsed = clock.elapsed_since(&start);
            log::debug!("{} passes over the buffer", passes);
            Measurement {
                elapsed,
                ops: loads,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Clock;

    #[test]
    fn loads_whole_passes() {
        let mut runner = AggressorRunner::new(Clock::wall());
        let mut aggressor = MemBwAggressor::new(0.01, 64 * 1024, Some(2000.0)).unwrap();
        let report = aggressor.run(&mut runner);
        // 1024 lines per pass
        assert!(report.ops > 0);
        assert_eq!(report.ops % 1024, 0);
        assert!(report.elapsed_secs >= 0.01);
        assert!(report.cycles_per_op.unwrap() > 0.0);
        assert_eq!(report.unit, "loads");
    }

    #[test]
    fn zero_duration_loads_nothing() {
        let (clock, _mock) = Clock::mock();
        let mut runner = AggressorRunner::new(clock);
        let mut aggressor = MemBwAggressor::new(0.0, 4096, None).unwrap();
        let report = aggressor.run(&mut runner);
        assert_eq!(report.ops, 0);
        assert_eq!(report.cycles_per_op, None);
        assert!(aggressor.warmed_up);
    }

    #[test]
    fn frequency_must_be_positive() {
        for mhz in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MemBwAggressor::new(1.0, 4096, Some(mhz)),
                Err(Error::InvalidFrequency(_))
            ));
        }
        let plan = MemBwAggressor::new(1.0, 4096, None).unwrap().plan();
        assert_eq!(plan.bytes_per_op, Some(64));
        assert_eq!(plan.buffer_bytes, Some(4096));
    }

    #[test]
    fn buffer_must_hold_a_full_step() {
        for bytes in [0, 64, 448, MIN_MEMBW_BUFFER_BYTES - 1] {
            assert!(matches!(
                MemBwAggressor::new(0.01, bytes, None),
                Err(Error::InvalidBufferSize(b, MIN_MEMBW_BUFFER_BYTES)) if b == bytes
            ));
        }
        let mut runner = AggressorRunner::new(Clock::wall());
        let mut aggressor = MemBwAggressor::new(0.01, MIN_MEMBW_BUFFER_BYTES, None).unwrap();
        let report = aggressor.run(&mut runner);
        assert!(report.ops > 0);
        assert_eq!(report.ops % LINES_PER_STEP as u64, 0);
    }
}
