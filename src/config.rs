use rustop::opts;
use yansi::Paint;

use crate::{
    aggressors::{L1iAggressor, L3Aggressor, MemBwAggressor, DEFAULT_MEMBW_BUFFER_BYTES},
    clock::Clock,
    error::Result,
    intensity::MAX_INTENSITY,
    plugins::PerfCounterPlugin,
    report::{JsonReporter, PlainReporter},
    runner::AggressorRunner,
};

/// Output and measurement options shared by all aggressors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Print the report as a JSON line instead of plain text.
    pub json: bool,
    /// Collect hardware counters with perf. Linux only.
    pub perf: bool,
    /// Measure process CPU time instead of wall-clock time.
    pub cpu_time: bool,
    /// Also print operation counts and time per operation.
    pub verbose: bool,
}

impl OutputOptions {
    /// Print the report as a JSON line instead of plain text.
    pub fn set_json(&mut self, json: bool) -> &mut Self {
        self.json = json;
        self
    }

    /// Enable perf counters + report
    ///
    /// The numbers are reported with the following legend:
    /// ```bash
    /// L1iM: L1 instruction cache read misses
    /// LLCM: last level cache read misses
    /// IRet: instructions retired
    /// Cycles: CPU cycles
    /// ```
    ///
    /// # Note:
    /// This is only available on Linux. On other OSs the perf plugin does nothing.
    pub fn enable_perf(&mut self) -> &mut Self {
        self.perf = true;
        self
    }

    /// Measure process CPU time instead of wall-clock time.
    pub fn set_cpu_time(&mut self, cpu_time: bool) -> &mut Self {
        self.cpu_time = cpu_time;
        self
    }

    /// Also print operation counts and time per operation.
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// The clock selected by these options.
    pub fn clock(&self) -> Result<Clock> {
        if self.cpu_time {
            Clock::process_cpu()
        } else {
            Ok(Clock::wall())
        }
    }

    /// Creates a runner with the selected clock, reporter and plugins.
    pub fn runner(&self) -> Result<AggressorRunner> {
        let mut runner = AggressorRunner::new(self.clock()?);
        let events = runner.get_event_manager();
        if self.json {
            events.add_listener_if_absent(JsonReporter::new());
        } else {
            events.add_listener_if_absent(PlainReporter::new().verbose(self.verbose));
        }
        // Registered last, so the counters are enabled after the plan lines are printed.
        if self.perf {
            events.add_listener_if_absent(PerfCounterPlugin::default());
        }
        Ok(runner)
    }
}

/// Configuration of the L1 instruction cache aggressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L1iConfig {
    /// Pressure level, validated when the aggressor is built.
    pub level: i64,
    /// Iteration count, `None` runs until terminated.
    pub iterations: Option<i64>,
    /// Output options
    pub output: OutputOptions,
}

impl Default for L1iConfig {
    fn default() -> Self {
        L1iConfig {
            level: MAX_INTENSITY as i64,
            iterations: Some(10),
            output: OutputOptions::default(),
        }
    }
}

impl L1iConfig {
    /// Parses the command line arguments. Exits the process on usage errors.
    pub fn from_args() -> Self {
        let res = opts! {
            synopsis "Stresses the L1 instruction cache. Runs until terminated if no iteration count is given.";
            opt cpu:bool, desc:"Measure process CPU time instead of wall-clock time.";
            opt json:bool, desc:"Print the report as a single JSON line.";
            opt perf:bool, desc:"Report hardware counters (Linux only).";
            opt verbose:bool, desc:"Also print the number of operations and the time per operation.";
            param level:i64, desc:"Intensity level, 0 (lowest) to 20 (highest).";
            param iterations:Option<i64>, desc:"Number of iterations.";
        }
        .parse();
        let (args, _rest) = exit_on_usage_error(res);
        L1iConfig {
            level: args.level,
            iterations: args.iterations,
            output: OutputOptions {
                json: args.json,
                perf: args.perf,
                cpu_time: args.cpu,
                verbose: args.verbose,
            },
        }
    }

    /// Validates the configuration.
    pub fn aggressor(&self) -> Result<L1iAggressor> {
        L1iAggressor::new(self.level, self.iterations)
    }
}

/// Configuration of the L3 cache aggressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L3Config {
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Buffer size, detected from sysfs if not set.
    pub buffer_bytes: Option<usize>,
    /// Output options
    pub output: OutputOptions,
}

impl Default for L3Config {
    fn default() -> Self {
        L3Config {
            duration_secs: 10.0,
            buffer_bytes: None,
            output: OutputOptions::default(),
        }
    }
}

impl L3Config {
    /// Parses the command line arguments. Exits the process on usage errors.
    pub fn from_args() -> Self {
        let res = opts! {
            synopsis "Thrashes the L3 cache by copying a cache sized buffer for the given time.";
            opt bytes:Option<usize>, desc:"Buffer size in bytes. Defaults to the detected L3 cache size.";
            opt cpu:bool, desc:"Measure process CPU time instead of wall-clock time.";
            opt json:bool, desc:"Print the report as a single JSON line.";
            opt perf:bool, desc:"Report hardware counters (Linux only).";
            opt verbose:bool, desc:"Also print the number of copies and the time per copy.";
            param duration:f64, desc:"Duration in seconds.";
        }
        .parse();
        let (args, _rest) = exit_on_usage_error(res);
        L3Config {
            duration_secs: args.duration,
            buffer_bytes: args.bytes,
            output: OutputOptions {
                json: args.json,
                perf: args.perf,
                cpu_time: args.cpu,
                verbose: args.verbose,
            },
        }
    }

    /// Validates the configuration, detecting the cache size if needed.
    pub fn aggressor(&self) -> Result<L3Aggressor> {
        match self.buffer_bytes {
            Some(bytes) => L3Aggressor::new(self.duration_secs, bytes),
            None => L3Aggressor::with_detected_cache_size(self.duration_secs),
        }
    }
}

/// Configuration of the memory bandwidth aggressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemBwConfig {
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Buffer size in bytes.
    pub buffer_bytes: usize,
    /// CPU frequency, enables the cycles per load report.
    pub cpu_mhz: Option<f64>,
    /// Output options
    pub output: OutputOptions,
}

impl Default for MemBwConfig {
    fn default() -> Self {
        MemBwConfig {
            duration_secs: 10.0,
            buffer_bytes: DEFAULT_MEMBW_BUFFER_BYTES,
            cpu_mhz: None,
            output: OutputOptions::default(),
        }
    }
}

impl MemBwConfig {
    /// Parses the command line arguments. Exits the process on usage errors.
    pub fn from_args() -> Self {
        let res = opts! {
            synopsis "Saturates memory bandwidth with strided loads over a large buffer for the given time.";
            opt bytes:Option<usize>, desc:"Buffer size in bytes. Defaults to 1 GiB.";
            opt mhz:Option<f64>, desc:"CPU frequency in MHz, enables the cycles per load report.";
            opt cpu:bool, desc:"Measure process CPU time instead of wall-clock time.";
            opt json:bool, desc:"Print the report as a single JSON line.";
            opt perf:bool, desc:"Report hardware counters (Linux only).";
            opt verbose:bool, desc:"Also print the number of loads and the time per load.";
            param duration:f64, desc:"Duration in seconds.";
        }
        .parse();
        let (args, _rest) = exit_on_usage_error(res);
        MemBwConfig {
            duration_secs: args.duration,
            buffer_bytes: args.bytes.unwrap_or(DEFAULT_MEMBW_BUFFER_BYTES),
            cpu_mhz: args.mhz,
            output: OutputOptions {
                json: args.json,
                perf: args.perf,
                cpu_time: args.cpu,
                verbose: args.verbose,
            },
        }
    }

    /// Validates the configuration.
    pub fn aggressor(&self) -> Result<MemBwAggressor> {
        MemBwAggressor::new(self.duration_secs, self.buffer_bytes, self.cpu_mhz)
    }
}

/// `--help` prints the usage and exits with 0, any other parse error is printed to stderr and
/// exits with 1.
fn exit_on_usage_error<T>(res: std::result::Result<T, rustop::Error>) -> T {
    use yansi::Condition;
    yansi::whenever(Condition::TTY_AND_COLOR);

    match res {
        Ok(args) => args,
        Err(rustop::Error::Help(help)) => {
            println!("{}", help);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            std::process::exit(1);
        }
    }
}
