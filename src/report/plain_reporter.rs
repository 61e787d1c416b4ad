use std::any::Any;

use yansi::Paint;

use super::format::{
    bytes_to_string, format_duration, format_float, format_throughput, format_with_underscores,
};
use crate::plugins::{AggressorEvents, EventListener};
use crate::runner::{RunPlan, RunReport};

/// Name of the plain reporter listener.
pub static PLAIN_REPORTER_NAME: &str = "_aggressor_plain_reporter";

#[derive(Clone, Copy, Default)]
/// The PlainReporter prints the plan of a run before it starts and the elapsed time afterwards.
/// This is the default reporter.
///
/// e.g.
/// ```text
/// iterations: 1500
/// intensity: 12
/// time spent: 0.412763 seconds
/// ```
///
/// In verbose mode the number of operations and the time per operation are printed as well.
pub struct PlainReporter {
    verbose: bool,
}

impl PlainReporter {
    /// Create a new PlainReporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print operation counts and time per operation.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The lines printed before the run starts.
    pub fn plan_lines(&self, plan: &RunPlan) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(iterations) = plan.iterations {
            lines.push(format!("iterations: {}", iterations));
        }
        if let Some(intensity) = plan.intensity {
            lines.push(format!("intensity: {}", intensity));
        }
        if let Some(duration) = plan.duration {
            lines.push(format!("duration: {} seconds", duration.as_secs_f64()));
        }
        if let Some(bytes) = plan.buffer_bytes {
            lines.push(format!(
                "buffer size: {} bytes ({})",
                bytes,
                bytes_to_string(bytes as u64)
            ));
        }
        lines
    }

    /// The lines printed after the run finished.
    pub fn report_lines(&self, report: &RunReport) -> Vec<String> {
        let mut lines = vec![format!("time spent: {:.6} seconds", report.elapsed_secs)];
        if self.verbose {
            lines.push(format!(
                "{}: {}",
                report.unit,
                format_with_underscores(report.ops)
            ));
            if let Some(ns) = report.ns_per_op {
                lines.push(format!("time per op: {}ns", format_float(ns)));
            }
        }
        if let Some(bytes_per_sec) = report.bytes_per_sec {
            lines.push(format!("throughput: {}", format_throughput(bytes_per_sec)));
        }
        if let Some(cycles) = report.cycles_per_op {
            lines.push(format!("reciprocal throughput: {} cycles", format_float(cycles)));
        }
        if let Some(counters) = report.counters.as_ref() {
            lines.push(counters.to_columns().join("  "));
            if let Some(ipc) = counters.ipc() {
                lines.push(format!("IPC: {}", format_float(ipc)));
            }
        }
        lines
    }
}

impl EventListener for PlainReporter {
    fn name(&self) -> &'static str {
        PLAIN_REPORTER_NAME
    }
    fn on_event(&mut self, event: AggressorEvents) {
        match event {
            AggressorEvents::RunStart(plan) => {
                for line in self.plan_lines(plan) {
                    println!("{}", line);
                }
                if plan.iterations.and_then(|it| it.count()).is_none() && plan.duration.is_none()
                {
                    log::info!("{} runs until terminated", plan.aggressor);
                }
            }
            AggressorEvents::Report(report) => {
                let mut lines = self.report_lines(report).into_iter();
                if let Some(first) = lines.next() {
                    println!("{}", first.bold());
                }
                for line in lines {
                    println!("{}", line);
                }
                if self.verbose {
                    let elapsed_ns = (report.elapsed_secs * 1e9) as u64;
                    log::debug!(
                        "{} finished after {}",
                        report.aggressor,
                        format_duration(elapsed_ns)
                    );
                }
            }
            AggressorEvents::RunStop(_) => {}
        }
    }
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        intensity::{Intensity, Iterations},
        plugins::CounterValues,
        Clock, Measurement,
    };

    fn l1i_plan(iterations: Iterations) -> RunPlan {
        RunPlan {
            intensity: Some(Intensity::new(12).unwrap()),
            iterations: Some(iterations),
            ..RunPlan::new("l1i")
        }
    }

    #[test]
    fn l1i_lines() {
        let reporter = PlainReporter::new();
        assert_eq!(
            reporter.plan_lines(&l1i_plan(Iterations::Finite(1500))),
            vec!["iterations: 1500", "intensity: 12"]
        );
        assert_eq!(
            reporter.plan_lines(&l1i_plan(Iterations::Infinite)),
            vec!["iterations: infinite", "intensity: 12"]
        );

        let report = RunReport::new(
            &l1i_plan(Iterations::Finite(1500)),
            &Clock::wall(),
            Measurement {
                elapsed: Duration::from_micros(412_763),
                ops: 1500 * 4096,
            },
            None,
        );
        assert_eq!(
            reporter.report_lines(&report),
            vec!["time spent: 0.412763 seconds"]
        );
    }

    #[test]
    fn verbose_and_derived_lines() {
        let plan = RunPlan {
            unit: "loads",
            duration: Some(Duration::from_secs(2)),
            buffer_bytes: Some(1 << 30),
            bytes_per_op: Some(64),
            cpu_mhz: Some(2000.0),
            ..RunPlan::new("membw")
        };
        let reporter = PlainReporter::new().verbose(true);
        assert_eq!(
            reporter.plan_lines(&plan),
            vec![
                "duration: 2 seconds",
                "buffer size: 1073741824 bytes (1.0 GiB)"
            ]
        );
        let counters = CounterValues {
            l1i_miss_count: 10,
            llc_miss_count: 2_000,
            instructions: 3_000,
            cpu_cycles: 1_500,
        };
        let report = RunReport::new(
            &plan,
            &Clock::wall(),
            Measurement {
                elapsed: Duration::from_millis(1),
                ops: 100_000,
            },
            Some(counters),
        );
        assert_eq!(
            reporter.report_lines(&report),
            vec![
                "time spent: 0.001000 seconds",
                "loads: 100_000",
                "time per op: 10.000ns",
                "throughput: 6.4000 GB/s",
                "reciprocal throughput: 20.000 cycles",
                "L1iM: 10  LLCM: 2_000  IRet: 3_000  Cycles: 1_500",
                "IPC: 2.0000",
            ]
        );
    }
}
