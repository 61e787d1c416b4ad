#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_imports,
    unused_qualifications,
    missing_docs
)]

//! Aggressor is a set of synthetic workloads that create contention on a single hardware
//! resource, so that the sensitivity of a co-located workload to that resource can be measured.
//!
//! There are 3 aggressors:
//! * [L1iAggressor](aggressors::L1iAggressor) stresses the L1 instruction cache with the
//!   intensity-scaled pressure generator in [pressure].
//! * [L3Aggressor](aggressors::L3Aggressor) evicts the last level cache by copying a cache sized
//!   buffer.
//! * [MemBwAggressor](aggressors::MemBwAggressor) saturates memory bandwidth with strided loads.
//!
//! Each of them ships as its own binary (`l1i`, `l3`, `membw`).
//!
//! # Intensity
//! The L1i aggressor takes an intensity level in `0..=20`. Level `n` executes `2^n` dependent
//! hazard operations per iteration. Only the requested level runs, lower levels are not executed
//! in addition.
//!
//! # Example
//! ```rust
//! use aggressor::{aggressors::L1iAggressor, report::PlainReporter, AggressorRunner, Clock};
//!
//! let mut runner = AggressorRunner::new(Clock::wall());
//! runner
//!     .get_event_manager()
//!     .add_listener_if_absent(PlainReporter::new());
//!
//! // Prints
//! // iterations: 1000
//! // intensity: 6
//! // time spent: 0.000071 seconds
//! let report = L1iAggressor::new(6, Some(1000)).unwrap().run(&mut runner);
//! assert_eq!(report.ops, 1000 * 64);
//! ```
//!
//! # Perf Integration
//! Hardware counters (L1i misses, LLC misses, instructions, cycles) can be collected with the
//! [PerfCounterPlugin](plugins::PerfCounterPlugin). This only works on Linux.
//!

pub mod aggressors;
/// Cache line aligned buffers
pub mod buffer;
pub mod cache_size;
pub mod clock;
pub mod plugins;
pub mod pressure;
/// The module to report run results
pub mod report;

mod config;
mod error;
mod intensity;
mod runner;

pub use clock::{Clock, Mark};
pub use config::{L1iConfig, L3Config, MemBwConfig, OutputOptions};
pub use error::{Error, Result};
pub use intensity::{Intensity, Iterations, MAX_INTENSITY, MIN_INTENSITY, REPEAT_COUNTS};
pub use runner::{AggressorRunner, Measurement, RunPlan, RunReport, RunState};

/// A function that is opaque to the optimizer, used to prevent the compiler from
/// optimizing away the work of an aggressor.
pub use std::hint::black_box;
