//! Time sources for measuring a run.
//!
//! The wall clock is monotonic and backed by [quanta]. The process CPU clock mirrors `clock()`
//! and only advances while the process is scheduled.
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// A clock sampled at the start and at the end of a run.
#[derive(Clone, Debug)]
pub enum Clock {
    /// Monotonic wall clock.
    Wall(quanta::Clock),
    /// CPU time consumed by this process.
    ProcessCpu,
}

/// A point in time taken from a [Clock].
#[derive(Clone, Copy, Debug)]
pub enum Mark {
    /// Taken from [Clock::Wall]
    Wall(quanta::Instant),
    /// Taken from [Clock::ProcessCpu]
    ProcessCpu(Duration),
}

impl Default for Clock {
    fn default() -> Self {
        Self::wall()
    }
}

impl Clock {
    /// Monotonic wall clock.
    pub fn wall() -> Self {
        Clock::Wall(quanta::Clock::new())
    }

    /// Process CPU time clock. Only available on Linux.
    pub fn process_cpu() -> Result<Self> {
        // Fail on construction rather than on the first sample inside a run.
        process_cpu_time()?;
        Ok(Clock::ProcessCpu)
    }

    /// A mocked wall clock, which only advances through the returned handle.
    pub fn mock() -> (Self, Arc<quanta::Mock>) {
        let (clock, mock) = quanta::Clock::mock();
        (Clock::Wall(clock), mock)
    }

    /// Human readable name of the time source.
    pub fn name(&self) -> &'static str {
        match self {
            Clock::Wall(_) => "wall",
            Clock::ProcessCpu => "cpu",
        }
    }

    /// Sample the clock.
    #[inline]
    pub fn now(&self) -> Mark {
        match self {
            Clock::Wall(clock) => Mark::Wall(clock.now()),
            Clock::ProcessCpu => Mark::ProcessCpu(cpu_time_or_zero(process_cpu_time())),
        }
    }

    /// Time elapsed since `start`. Never negative.
    #[inline]
    pub fn elapsed_since(&self, start: &Mark) -> Duration {
        Self::between(start, &self.now())
    }

    /// Time between two marks of the same clock, saturating at zero.
    pub fn between(start: &Mark, end: &Mark) -> Duration {
        match (start, end) {
            (Mark::Wall(start), Mark::Wall(end)) => end.saturating_duration_since(*start),
            (Mark::ProcessCpu(start), Mark::ProcessCpu(end)) => end.saturating_sub(*start),
            _ => Duration::ZERO,
        }
    }
}

/// Checked in [Clock::process_cpu], so a failure here is unexpected. The zero mark makes the
/// elapsed time of the run meaningless, which is logged.
fn cpu_time_or_zero(sample: Result<Duration>) -> Duration {
    match sample {
        Ok(time) => time,
        Err(err) => {
            log::warn!("reading the process cpu time failed, elapsed time is wrong: {}", err);
            Duration::ZERO
        }
    }
}

#[cfg(target_os = "linux")]
fn process_cpu_time() -> Result<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec.
    let ret = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if ret != 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }
    Ok(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(target_os = "linux"))]
fn process_cpu_time() -> Result<Duration> {
    Err(Error::Unsupported("process cpu time clock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_reports_increments() {
        let (clock, mock) = Clock::mock();
        let start = clock.now();
        mock.increment(Duration::from_millis(250));
        assert_eq!(clock.elapsed_since(&start), Duration::from_millis(250));
        mock.increment(Duration::from_secs(1));
        assert_eq!(clock.elapsed_since(&start), Duration::from_millis(1250));
    }

    #[test]
    fn mixed_marks_are_zero() {
        let (clock, mock) = Clock::mock();
        let wall = clock.now();
        mock.increment(Duration::from_secs(1));
        let cpu = Mark::ProcessCpu(Duration::from_secs(5));
        assert_eq!(Clock::between(&wall, &cpu), Duration::ZERO);
        assert_eq!(Clock::between(&cpu, &wall), Duration::ZERO);
    }

    #[test]
    fn failed_cpu_sample_is_zero() {
        assert_eq!(
            cpu_time_or_zero(Ok(Duration::from_millis(3))),
            Duration::from_millis(3)
        );
        let failed = Err(Error::Unsupported("process cpu time clock"));
        assert_eq!(cpu_time_or_zero(failed), Duration::ZERO);
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = Clock::wall();
        let start = clock.now();
        let first = clock.elapsed_since(&start);
        let second = clock.elapsed_since(&start);
        assert!(second >= first);
        assert_eq!(clock.name(), "wall");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_cpu_clock_advances_with_work() {
        let clock = Clock::process_cpu().unwrap();
        let start = clock.now();
        let mut acc = 0u64;
        for i in 0..5_000_000u64 {
            acc = std::hint::black_box(acc.wrapping_add(i));
        }
        std::hint::black_box(acc);
        assert!(clock.elapsed_since(&start) > Duration::ZERO);
        assert_eq!(clock.name(), "cpu");
    }
}
