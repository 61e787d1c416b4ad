//! Linux specific code for perf counter integration.
use std::error::Error;

use crate::plugins::{AggressorEvents, EventListener};
use perf_event::events::{Cache, CacheOp, CacheResult, Hardware, WhichCache};
use perf_event::Counter;
use perf_event::{Builder, Group};
use std::any::Any;

use super::{CounterValues, PERF_CNT_EVENT_LISTENER_NAME};

pub(crate) struct PerfCounters {
    group: Group,
    l1i_miss_counter: Counter,
    llc_miss_counter: Counter,
    instructions: Counter,
    cycles: Counter,
}
impl PerfCounters {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let mut group = Group::new()?;
        const L1I_MISS: Cache = Cache {
            which: WhichCache::L1I,
            operation: CacheOp::READ,
            result: CacheResult::MISS,
        };
        const LLC_MISS: Cache = Cache {
            which: WhichCache::LL,
            ..L1I_MISS
        };
        let l1i_miss_counter = Builder::new().group(&mut group).kind(L1I_MISS).build()?;
        let llc_miss_counter = Builder::new().group(&mut group).kind(LLC_MISS).build()?;

        let instructions = Builder::new()
            .group(&mut group)
            .kind(Hardware::INSTRUCTIONS)
            .build()?;
        let cycles = Builder::new()
            .group(&mut group)
            .kind(Hardware::CPU_CYCLES)
            .build()?;
        group.disable()?;

        Ok(PerfCounters {
            group,
            l1i_miss_counter,
            llc_miss_counter,
            instructions,
            cycles,
        })
    }

    pub fn enable(&mut self) -> std::io::Result<()> {
        self.group.reset()?;
        self.group.enable()
    }
    pub fn disable(&mut self) -> std::io::Result<()> {
        self.group.disable()
    }
    pub fn read(&mut self) -> std::io::Result<CounterValues> {
        Ok(CounterValues {
            l1i_miss_count: self.l1i_miss_counter.read()?,
            llc_miss_count: self.llc_miss_counter.read()?,
            instructions: self.instructions.read()?,
            cpu_cycles: self.cycles.read()?,
        })
    }
}

///
/// Plugin to report perf counters of a run.
///
/// Counts L1 instruction cache misses, last level cache misses, instructions and cycles between
/// `RunStart` and `RunStop`.
///
/// # Note:
/// This is only available on Linux. On other OSs this does nothing.
///
/// Perf may run into limitations where all counters are reported as zero. <https://github.com/jimblandy/perf-event/issues/2>.
/// Disabling the NMI watchdog should help:
///
/// `sudo sh -c "echo '0' > /proc/sys/kernel/nmi_watchdog"`
///
/// ## Usage Example
/// ```rust
/// use aggressor::{*, plugins::*};
///
/// let mut runner = AggressorRunner::new(Clock::wall());
/// runner
///    .get_event_manager()
///    .add_listener_if_absent(PerfCounterPlugin::default());
/// ```
#[derive(Default)]
pub struct PerfCounterPlugin {
    perf: Option<PerfCounters>,
    values: Option<CounterValues>,
}

impl PerfCounterPlugin {
    /// Takes the counter values of the last finished run.
    pub fn take_values(&mut self) -> Option<CounterValues> {
        self.values.take()
    }

    fn start(&mut self) {
        self.values = None;
        if self.perf.is_none() {
            match PerfCounters::new() {
                Ok(perf) => self.perf = Some(perf),
                Err(err) => {
                    log::warn!("perf counters are not available: {}", err);
                    return;
                }
            }
        }
        if let Some(perf) = self.perf.as_mut() {
            if let Err(err) = perf.enable() {
                log::warn!("could not enable perf counters: {}", err);
            }
        }
    }

    fn stop(&mut self) {
        let Some(perf) = self.perf.as_mut() else {
            return;
        };
        let values = perf.disable().and_then(|_| perf.read());
        match values {
            Ok(values) => self.values = Some(values),
            Err(err) => log::warn!("could not read perf counters: {}", err),
        }
    }
}

impl EventListener for PerfCounterPlugin {
    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
    fn name(&self) -> &'static str {
        PERF_CNT_EVENT_LISTENER_NAME
    }
    fn on_event(&mut self, event: AggressorEvents) {
        match event {
            AggressorEvents::RunStart(_) => self.start(),
            AggressorEvents::RunStop(_) => self.stop(),
            AggressorEvents::Report(_) => {}
        }
    }
}
