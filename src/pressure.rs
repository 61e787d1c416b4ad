//! The intensity-scaled pressure generator behind the L1 instruction cache aggressor.
//!
//! Every iteration executes a body of `2^level` hazard operations in strict sequence. Each
//! operation depends on the result of the previous one and is routed through [black_box], so the
//! optimizer can neither drop nor fold it.
//!
//! Up to [MAX_INLINE_LEVEL] the body of a level is emitted as `2^level` inline copies of the
//! operation, so the instruction footprint of the loop doubles with every level. Above it the
//! largest inline body is looped, only the operation count keeps growing.
//!
//! # Example
//! ```rust
//! use aggressor::pressure;
//!
//! // 100 iterations of 2^3 operations each.
//! let elapsed_secs = pressure::run(3, Some(100)).unwrap();
//! assert!(elapsed_secs >= 0.0);
//!
//! assert!(pressure::run(21, Some(10)).is_err());
//! ```
use std::hint::black_box;

use crate::{
    clock::Clock,
    error::Result,
    intensity::{Intensity, Iterations, REPEAT_COUNTS},
    Measurement,
};

/// Highest level whose body is fully inlined.
pub const MAX_INLINE_LEVEL: u8 = 12;

/// Operations in the largest inline body. Higher levels repeat it.
pub const MAX_INLINE_OPS: u32 = REPEAT_COUNTS[MAX_INLINE_LEVEL as usize];

/// A single micro-operation applied repeatedly by the generator.
pub trait Hazard {
    /// Apply the operation once. The effect must be opaque to the optimizer.
    fn apply(&mut self);
}

/// Two words XORed into each other, creating a serial data dependency.
#[derive(Debug, Clone, Copy)]
pub struct XorHazard {
    x: u32,
    y: u32,
}

impl Default for XorHazard {
    fn default() -> Self {
        XorHazard { x: 0xf0, y: 0x0f }
    }
}

impl XorHazard {
    /// The current value of the accumulating word.
    pub fn value(&self) -> u32 {
        self.x
    }
}

impl Hazard for XorHazard {
    #[inline(always)]
    fn apply(&mut self) {
        self.x = black_box(self.x ^ self.y);
    }
}

macro_rules! pressure1 { ($h:ident) => { $h.apply(); }; }
macro_rules! pressure2 { ($h:ident) => { pressure1!($h); pressure1!($h); }; }
macro_rules! pressure4 { ($h:ident) => { pressure2!($h); pressure2!($h); }; }
macro_rules! pressure8 { ($h:ident) => { pressure4!($h); pressure4!($h); }; }
macro_rules! pressure16 { ($h:ident) => { pressure8!($h); pressure8!($h); }; }
macro_rules! pressure32 { ($h:ident) => { pressure16!($h); pressure16!($h); }; }
macro_rules! pressure64 { ($h:ident) => { pressure32!($h); pressure32!($h); }; }
macro_rules! pressure128 { ($h:ident) => { pressure64!($h); pressure64!($h); }; }
macro_rules! pressure256 { ($h:ident) => { pressure128!($h); pressure128!($h); }; }
macro_rules! pressure512 { ($h:ident) => { pressure256!($h); pressure256!($h); }; }
macro_rules! pressure1024 { ($h:ident) => { pressure512!($h); pressure512!($h); }; }
macro_rules! pressure2048 { ($h:ident) => { pressure1024!($h); pressure1024!($h); }; }
macro_rules! pressure4096 { ($h:ident) => { pressure2048!($h); pressure2048!($h); }; }

macro_rules! repeat_body {
    ($count:expr, $body:ident, $h:ident) => {
        for _ in 0..$count {
            $body!($h);
        }
    };
}

/// Executes `count` iterations of the body of `intensity`.
///
/// The level is matched once, outside of the loop.
fn iterate<H: Hazard>(hazard: &mut H, intensity: Intensity, count: u64) {
    match intensity.level() {
        0 => repeat_body!(count, pressure1, hazard),
        1 => repeat_body!(count, pressure2, hazard),
        2 => repeat_body!(count, pressure4, hazard),
        3 => repeat_body!(count, pressure8, hazard),
        4 => repeat_body!(count, pressure16, hazard),
        5 => repeat_body!(count, pressure32, hazard),
        6 => repeat_body!(count, pressure64, hazard),
        7 => repeat_body!(count, pressure128, hazard),
        8 => repeat_body!(count, pressure256, hazard),
        9 => repeat_body!(count, pressure512, hazard),
        10 => repeat_body!(count, pressure1024, hazard),
        11 => repeat_body!(count, pressure2048, hazard),
        12 => repeat_body!(count, pressure4096, hazard),
        _ => {
            let chunks = intensity.repeat_count() / MAX_INLINE_OPS;
            for _ in 0..count {
                repeat_body!(chunks, pressure4096, hazard);
            }
        }
    }
}

/// Validates `level` and `iterations`, then runs the generator with the default [XorHazard] on
/// the wall clock.
///
/// Returns the elapsed time in seconds. `iterations == None` runs forever.
///
/// # Errors
/// `InvalidLevel` if `level` is outside `[0, 20]`, `InvalidIterationCount` if `iterations` is
/// negative. Nothing is executed in that case.
pub fn run(level: i64, iterations: Option<i64>) -> Result<f64> {
    let intensity = Intensity::new(level)?;
    let iterations = Iterations::new(iterations)?;
    let clock = Clock::wall();
    let measurement = run_with_hazard(intensity, iterations, &mut XorHazard::default(), &clock);
    Ok(measurement.elapsed_secs())
}

/// Runs the generator with a caller supplied hazard and clock.
///
/// The clock is sampled right before the first iteration and right after the last one. With
/// [Iterations::Infinite] this function never returns.
pub fn run_with_hazard<H: Hazard>(
    intensity: Intensity,
    iterations: Iterations,
    hazard: &mut H,
    clock: &Clock,
) -> Measurement {
    match iterations {
        Iterations::Finite(count) => {
            let start = clock.now();
            iterate(hazard, intensity, count);
            let elapsed = clock.elapsed_since(&start);
            Measurement {
                elapsed,
                ops: count * intensity.repeat_count() as u64,
            }
        }
        Iterations::Infinite => loop {
            iterate(hazard, intensity, u64::MAX);
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;

    #[derive(Default)]
    struct CountingHazard {
        count: u64,
    }

    impl Hazard for CountingHazard {
        fn apply(&mut self) {
            self.count += 1;
        }
    }

    fn count_ops(level: i64, iterations: u64) -> u64 {
        let mut hazard = CountingHazard::default();
        let intensity = Intensity::new(level).unwrap();
        let measurement = run_with_hazard(
            intensity,
            Iterations::Finite(iterations),
            &mut hazard,
            &Clock::wall(),
        );
        assert_eq!(measurement.ops, hazard.count);
        hazard.count
    }

    #[test]
    fn ops_per_iteration_match_level() {
        for level in 0..=20 {
            assert_eq!(count_ops(level, 1), 1u64 << level, "level {}", level);
        }
    }

    #[test]
    fn inline_body_divides_higher_levels() {
        assert_eq!(MAX_INLINE_OPS, 4096);
        for intensity in Intensity::all().filter(|i| i.level() > MAX_INLINE_LEVEL) {
            assert_eq!(intensity.repeat_count() % MAX_INLINE_OPS, 0);
        }
        assert_eq!(count_ops(12, 3), 3 * 4096);
        assert_eq!(count_ops(13, 3), 3 * 8192);
    }

    #[test]
    fn ops_scale_with_iterations() {
        assert_eq!(count_ops(3, 100), 800);
        assert_eq!(count_ops(0, 7), 7);
        assert_eq!(count_ops(2, 5), 20);
    }

    #[test]
    fn zero_iterations_do_nothing() {
        assert_eq!(count_ops(5, 0), 0);
        let elapsed = run(5, Some(0)).unwrap();
        assert!(elapsed >= 0.0);
    }

    #[test]
    fn invalid_input_fails_before_running() {
        assert!(matches!(run(-1, Some(10)), Err(Error::InvalidLevel(-1))));
        assert!(matches!(run(21, Some(10)), Err(Error::InvalidLevel(21))));
        assert!(matches!(
            run(5, Some(-1)),
            Err(Error::InvalidIterationCount(-1))
        ));
        // An invalid level is reported even for an unbounded run, which would otherwise never
        // return.
        assert!(matches!(run(42, None), Err(Error::InvalidLevel(42))));
    }

    #[test]
    fn xor_hazard_toggles() {
        let mut hazard = XorHazard::default();
        hazard.apply();
        assert_eq!(hazard.value(), 0xff);
        hazard.apply();
        assert_eq!(hazard.value(), 0xf0);
        // An even number of operations leaves the word unchanged.
        run_with_hazard(
            Intensity::new(4).unwrap(),
            Iterations::Finite(3),
            &mut hazard,
            &Clock::wall(),
        );
        assert_eq!(hazard.value(), 0xf0);
    }

    #[test]
    fn elapsed_comes_from_the_clock() {
        let (clock, _mock) = Clock::mock();
        let measurement = run_with_hazard(
            Intensity::new(2).unwrap(),
            Iterations::Finite(10),
            &mut XorHazard::default(),
            &clock,
        );
        // The mock clock does not advance on its own.
        assert_eq!(measurement.elapsed, Duration::ZERO);
        assert_eq!(measurement.ops, 40);
    }

    #[test]
    fn elapsed_grows_with_iterations() {
        // Compare the best of a few trials to keep scheduler noise out.
        let best = |iterations: i64| {
            (0..5)
                .map(|_| run(10, Some(iterations)).unwrap())
                .fold(f64::INFINITY, f64::min)
        };
        let short = best(1);
        let long = best(2_000);
        assert!(long >= short, "{} < {}", long, short);
    }
}
