//! The aggressor workloads.
//!
//! Each aggressor validates its parameters on construction and is then run on an
//! [AggressorRunner](crate::AggressorRunner), which drives the registered listeners.
use std::time::Duration;

use crate::error::{Error, Result};

mod l1i;
mod l3;
mod membw;

pub use l1i::L1iAggressor;
pub use l3::{L3Aggressor, MIN_L3_BUFFER_BYTES};
pub use membw::{MemBwAggressor, DEFAULT_MEMBW_BUFFER_BYTES, MIN_MEMBW_BUFFER_BYTES};

/// Converts a duration in seconds, rejecting negative and non finite values.
pub fn duration_from_secs(secs: f64) -> Result<Duration> {
    if secs < 0.0 {
        return Err(Error::InvalidDuration(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidDuration(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(duration_from_secs(0.0).unwrap(), Duration::ZERO);
        assert_eq!(duration_from_secs(1.5).unwrap(), Duration::from_millis(1500));
        for secs in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                duration_from_secs(secs),
                Err(Error::InvalidDuration(_))
            ));
        }
    }
}
