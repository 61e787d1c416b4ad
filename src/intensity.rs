use std::fmt;

use crate::error::{Error, Result};

/// Lowest intensity level. One hazard operation per iteration.
pub const MIN_INTENSITY: u8 = 0;
/// Highest intensity level. `2^20` hazard operations per iteration.
pub const MAX_INTENSITY: u8 = 20;

/// Number of hazard operations executed per iteration, indexed by intensity level.
///
/// This is a static table on purpose, the hot loop only ever indexes into it.
pub const REPEAT_COUNTS: [u32; MAX_INTENSITY as usize + 1] = [
    1,
    2,
    4,
    8,
    16,
    32,
    64,
    128,
    256,
    512,
    1_024,
    2_048,
    4_096,
    8_192,
    16_384,
    32_768,
    65_536,
    131_072,
    262_144,
    524_288,
    1_048_576,
];

/// A validated pressure level in `[MIN_INTENSITY, MAX_INTENSITY]`.
///
/// Level `n` executes exactly `2^n` hazard operations per iteration. Lower levels are not
/// executed in addition, i.e. the ladder is not cumulative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Intensity(u8);

impl Intensity {
    /// Validates `level`. Out of range values are rejected, never clamped.
    pub fn new(level: i64) -> Result<Self> {
        if level < MIN_INTENSITY as i64 || level > MAX_INTENSITY as i64 {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Intensity(level as u8))
    }

    /// The most intensive level.
    pub fn max() -> Self {
        Intensity(MAX_INTENSITY)
    }

    /// Iterates over every level of the ladder, from the lowest to the highest.
    pub fn all() -> impl Iterator<Item = Intensity> {
        (MIN_INTENSITY..=MAX_INTENSITY).map(Intensity)
    }

    /// The level as a plain number.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Hazard operations per iteration for this level.
    #[inline(always)]
    pub fn repeat_count(self) -> u32 {
        REPEAT_COUNTS[self.0 as usize]
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity(MIN_INTENSITY)
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many times the body of an aggressor is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Iterations {
    /// Run the body this many times. `0` means the body is never executed.
    Finite(u64),
    /// Run until the process is terminated from the outside.
    Infinite,
}

impl Iterations {
    /// Validates an optional iteration count. `None` means unbounded.
    pub fn new(iterations: Option<i64>) -> Result<Self> {
        match iterations {
            None => Ok(Iterations::Infinite),
            Some(n) if n < 0 => Err(Error::InvalidIterationCount(n)),
            Some(n) => Ok(Iterations::Finite(n as u64)),
        }
    }

    /// The finite count, `None` when unbounded.
    pub fn count(self) -> Option<u64> {
        match self {
            Iterations::Finite(n) => Some(n),
            Iterations::Infinite => None,
        }
    }
}

impl fmt::Display for Iterations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Iterations::Finite(n) => write!(f, "{}", n),
            Iterations::Infinite => write!(f, "infinite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_counts_double_per_level() {
        for intensity in Intensity::all() {
            assert_eq!(
                intensity.repeat_count() as u64,
                1u64 << intensity.level(),
                "level {}",
                intensity
            );
        }
        assert_eq!(Intensity::all().count(), 21);
    }

    #[test]
    fn ladder_bounds() {
        assert_eq!(Intensity::new(0).unwrap().repeat_count(), 1);
        assert_eq!(Intensity::new(20).unwrap().repeat_count(), 1 << 20);
        assert_eq!(Intensity::max(), Intensity::new(20).unwrap());
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        for level in [-1, 21, i64::MIN, i64::MAX, 255, 256] {
            match Intensity::new(level) {
                Err(Error::InvalidLevel(l)) => assert_eq!(l, level),
                other => panic!("expected InvalidLevel for {}, got {:?}", level, other),
            }
        }
    }

    #[test]
    fn iterations_validation() {
        assert_eq!(Iterations::new(None).unwrap(), Iterations::Infinite);
        assert_eq!(Iterations::new(Some(0)).unwrap(), Iterations::Finite(0));
        assert_eq!(Iterations::new(Some(42)).unwrap().count(), Some(42));
        assert!(matches!(
            Iterations::new(Some(-1)),
            Err(Error::InvalidIterationCount(-1))
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Iterations::Infinite.to_string(), "infinite");
        assert_eq!(Iterations::Finite(1500).to_string(), "1500");
        assert_eq!(Intensity::new(7).unwrap().to_string(), "7");
        assert_eq!(
            Error::InvalidLevel(21).to_string(),
            "intensity value (21) is out of range <0;20>"
        );
    }
}
