use std::time::Duration;

use crate::{
    buffer::{CacheLineBuffer, CACHE_LINE_SIZE},
    cache_size::detect_l3_cache_size,
    error::{Error, Result},
    runner::{AggressorRunner, Measurement, RunPlan, RunReport},
};

use super::duration_from_secs;

/// Smallest buffer with a non empty upper half.
pub const MIN_L3_BUFFER_BYTES: usize = 2 * CACHE_LINE_SIZE;

/// Keeps the last level cache busy by repeatedly copying the upper half of a cache sized buffer
/// over its lower half.
///
/// The thread yields after every copy, which gives co-located workloads a chance to run while
/// their cache lines are being evicted. Only the time spent copying and yielding counts towards
/// the duration.
pub struct L3Aggressor {
    duration: Duration,
    buffer: CacheLineBuffer,
}

impl L3Aggressor {
    /// Creates an aggressor working on a buffer of `buffer_bytes`, at least
    /// [MIN_L3_BUFFER_BYTES].
    pub fn new(duration_secs: f64, buffer_bytes: usize) -> Result<Self> {
        let duration = duration_from_secs(duration_secs)?;
        Self::with_buffer(duration, buffer_bytes)
    }

    fn with_buffer(duration: Duration, buffer_bytes: usize) -> Result<Self> {
        if buffer_bytes < MIN_L3_BUFFER_BYTES {
            return Err(Error::InvalidBufferSize(buffer_bytes, MIN_L3_BUFFER_BYTES));
        }
        Ok(L3Aggressor {
            duration,
            buffer: CacheLineBuffer::new(buffer_bytes),
        })
    }

    /// Creates an aggressor with a buffer as large as the L3 cache of this machine.
    pub fn with_detected_cache_size(duration_secs: f64) -> Result<Self> {
        let duration = duration_from_secs(duration_secs)?;
        let cache_size = detect_l3_cache_size()?;
        log::info!("Detected L3 cache size: {} bytes", cache_size);
        Self::with_buffer(duration, cache_size)
    }

    /// Size of the buffer in bytes.
    pub fn buffer_bytes(&self) -> usize {
        self.buffer.size_in_bytes()
    }

    /// The plan emitted before the run starts.
    pub fn plan(&self) -> RunPlan {
        let bytes = self.buffer.size_in_bytes();
        RunPlan {
            unit: "copies",
            duration: Some(self.duration),
            buffer_bytes: Some(bytes),
            bytes_per_op: Some((bytes / 2) as u64),
            ..RunPlan::new("l3")
        }
    }

    /// Runs until the accumulated copy time reaches the duration.
    pub fn run(&mut self, runner: &mut AggressorRunner) -> RunReport {
        let plan = self.plan();
        let duration = self.duration;
        let buffer = &mut self.buffer;
        runner.execute(&plan, |clock| {
            let mut spent = Duration::ZERO;
            let mut copies = 0u64;
            while spent < duration {
                let start = clock.now();
                buffer.copy_upper_half_into_lower();
                std::thread::yield_now();
                spent += clock.elapsed_since(&start);
                copies += 1;
            }
            Measurement {
                elapsed: spent,
                ops: copies,
            }
        })
    }
}
