use std::time::Duration;

use miniserde::{Deserialize, Serialize};

use crate::{
    clock::Clock,
    intensity::{Intensity, Iterations},
    plugins::{
        AggressorEvents, CounterValues, EventManager, PerfCounterPlugin,
        PERF_CNT_EVENT_LISTENER_NAME,
    },
};

/// What an aggressor did during its timed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Time between the clock samples around the timed region.
    pub elapsed: Duration,
    /// Number of operations (hazards, copies or loads) performed.
    pub ops: u64,
}

impl Measurement {
    /// Elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// The lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing was executed yet.
    NotStarted,
    /// The timed region is executing. Unbounded runs never leave this state.
    Running,
    /// The run finished and was reported.
    Completed,
}

/// Describes a run before it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunPlan {
    /// Name of the aggressor, e.g. `l1i`.
    pub aggressor: &'static str,
    /// What a single operation is, e.g. `loads`.
    pub unit: &'static str,
    /// Pressure level, only set for the L1i aggressor.
    pub intensity: Option<Intensity>,
    /// Iteration bound.
    pub iterations: Option<Iterations>,
    /// Duration bound.
    pub duration: Option<Duration>,
    /// Size of the buffer the aggressor works on.
    pub buffer_bytes: Option<usize>,
    /// Bytes moved by a single operation, enables throughput reporting.
    pub bytes_per_op: Option<u64>,
    /// CPU frequency, used to convert time per operation into cycles.
    pub cpu_mhz: Option<f64>,
}

impl RunPlan {
    /// A plan without any bounds.
    pub fn new(aggressor: &'static str) -> Self {
        RunPlan {
            aggressor,
            unit: "operations",
            intensity: None,
            iterations: None,
            duration: None,
            buffer_bytes: None,
            bytes_per_op: None,
            cpu_mhz: None,
        }
    }
}

/// The result of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the aggressor.
    pub aggressor: String,
    /// The time source, `wall` or `cpu`.
    pub clock: String,
    /// What a single operation is.
    pub unit: String,
    /// Pressure level if any.
    pub intensity: Option<u8>,
    /// Iteration count if the run was bounded by iterations.
    pub iterations: Option<u64>,
    /// Requested duration in seconds if the run was bounded by time.
    pub duration_secs: Option<f64>,
    /// Buffer size if any.
    pub buffer_bytes: Option<u64>,
    /// Measured time in seconds.
    pub elapsed_secs: f64,
    /// Number of operations.
    pub ops: u64,
    /// Average nanoseconds per operation, `None` if no operation was executed.
    pub ns_per_op: Option<f64>,
    /// Average cycles per operation, only if the CPU frequency is known.
    pub cycles_per_op: Option<f64>,
    /// Bytes moved per second, only if the plan knows the bytes per operation.
    pub bytes_per_sec: Option<f64>,
    /// Hardware counters, only if the perf plugin is registered and available.
    pub counters: Option<CounterValues>,
}

impl RunReport {
    pub(crate) fn new(
        plan: &RunPlan,
        clock: &Clock,
        measurement: Measurement,
        counters: Option<CounterValues>,
    ) -> Self {
        let ns_per_op = if measurement.ops == 0 {
            None
        } else {
            Some(measurement.elapsed.as_nanos() as f64 / measurement.ops as f64)
        };
        let cycles_per_op = ns_per_op
            .zip(plan.cpu_mhz)
            .map(|(ns, mhz)| ns * mhz / 1_000.0);
        let bytes_per_sec = ns_per_op
            .filter(|ns| *ns > 0.0)
            .zip(plan.bytes_per_op)
            .map(|(ns, bytes)| bytes as f64 * 1e9 / ns);
        RunReport {
            aggressor: plan.aggressor.to_string(),
            clock: clock.name().to_string(),
            unit: plan.unit.to_string(),
            intensity: plan.intensity.map(Intensity::level),
            iterations: plan.iterations.and_then(Iterations::count),
            duration_secs: plan.duration.map(|d| d.as_secs_f64()),
            buffer_bytes: plan.buffer_bytes.map(|b| b as u64),
            elapsed_secs: measurement.elapsed_secs(),
            ops: measurement.ops,
            ns_per_op,
            cycles_per_op,
            bytes_per_sec,
            counters,
        }
    }
}

/// Runs a measured closure and drives the event listeners around it.
///
/// The runner itself has no notion of what is measured, see the
/// [aggressors](crate::aggressors) for the workloads.
pub struct AggressorRunner {
    clock: Clock,
    events: EventManager,
    state: RunState,
}

impl AggressorRunner {
    /// Creates a runner measuring with `clock`.
    pub fn new(clock: Clock) -> Self {
        AggressorRunner {
            clock,
            events: EventManager::new(),
            state: RunState::NotStarted,
        }
    }

    /// The clock used for measuring.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current state of the last run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns the event manager, which can be used to add listeners.
    pub fn get_event_manager(&mut self) -> &mut EventManager {
        &mut self.events
    }

    /// Emits `RunStart`, executes `work`, emits `RunStop` and `Report`.
    ///
    /// `work` is responsible for sampling the clock around its hot loop.
    pub fn execute<F>(&mut self, plan: &RunPlan, work: F) -> RunReport
    where
        F: FnOnce(&Clock) -> Measurement,
    {
        self.state = RunState::Running;
        self.events.emit(AggressorEvents::RunStart(plan));
        let measurement = work(&self.clock);
        self.events.emit(AggressorEvents::RunStop(plan));

        let counters = self
            .events
            .downcast_listener::<PerfCounterPlugin>(PERF_CNT_EVENT_LISTENER_NAME)
            .and_then(PerfCounterPlugin::take_values);
        let report = RunReport::new(plan, &self.clock, measurement, counters);
        self.events.emit(AggressorEvents::Report(&report));
        self.state = RunState::Completed;
        report
    }
}
