use crate::intensity::{MAX_INTENSITY, MIN_INTENSITY};

/// Errors reported by the aggressors.
///
/// Precondition violations (`InvalidLevel`, `InvalidIterationCount`, `InvalidDuration`,
/// `InvalidBufferSize`) are detected before a run starts, so a failed run never performed any
/// work.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The intensity level is outside of the supported ladder.
    #[error("intensity value ({}) is out of range <{};{}>", .0, MIN_INTENSITY, MAX_INTENSITY)]
    InvalidLevel(i64),
    /// A finite iteration count was negative.
    #[error("iterations value ({0}) must not be negative")]
    InvalidIterationCount(i64),
    /// The run duration is negative or not a number.
    #[error("duration ({0}) must be a non-negative number of seconds")]
    InvalidDuration(f64),
    /// The CPU frequency is not a positive number.
    #[error("cpu frequency ({0} MHz) must be a positive number")]
    InvalidFrequency(f64),
    /// The buffer is too small for the aggressor to touch any memory.
    #[error("buffer size ({0} bytes) is below the minimum of {1} bytes")]
    InvalidBufferSize(usize, usize),
    /// A cache size string could not be parsed.
    #[error("could not parse cache size `{0}`")]
    InvalidCacheSize(String),
    /// The requested facility is not available on this platform.
    #[error("not supported: {0}")]
    Unsupported(&'static str),
    /// std::io error
    #[error("std::io error: `{0}`")]
    Io(#[from] std::io::Error),
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
