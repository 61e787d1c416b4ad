use crate::{
    error::Result,
    intensity::{Intensity, Iterations},
    pressure::{run_with_hazard, XorHazard},
    runner::{AggressorRunner, RunPlan, RunReport},
};

/// Stresses the L1 instruction cache and the front end with the intensity-scaled pressure
/// generator.
///
/// # Example
/// ```rust
/// use aggressor::{aggressors::L1iAggressor, AggressorRunner, Clock};
///
/// let aggressor = L1iAggressor::new(4, Some(100)).unwrap();
/// let mut runner = AggressorRunner::new(Clock::wall());
/// let report = aggressor.run(&mut runner);
/// assert_eq!(report.ops, 100 * 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1iAggressor {
    intensity: Intensity,
    iterations: Iterations,
}

impl L1iAggressor {
    /// Validates the level and the iteration count. `None` means unbounded.
    pub fn new(level: i64, iterations: Option<i64>) -> Result<Self> {
        Ok(Self::with(Intensity::new(level)?, Iterations::new(iterations)?))
    }

    /// Creates the aggressor from already validated parameters.
    pub fn with(intensity: Intensity, iterations: Iterations) -> Self {
        L1iAggressor {
            intensity,
            iterations,
        }
    }

    /// The pressure level.
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// The iteration bound.
    pub fn iterations(&self) -> Iterations {
        self.iterations
    }

    /// The plan emitted before the run starts.
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            unit: "hazard operations",
            intensity: Some(self.intensity),
            iterations: Some(self.iterations),
            ..RunPlan::new("l1i")
        }
    }

    /// Runs the aggressor. With [Iterations::Infinite] this never returns.
    pub fn run(&self, runner: &mut AggressorRunner) -> RunReport {
        let plan = self.plan();
        runner.execute(&plan, |clock| {
            run_with_hazard(
                self.intensity,
                self.iterations,
                &mut XorHazard::default(),
                clock,
            )
        })
    }
}
