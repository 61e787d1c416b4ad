use aggressor::{
    aggressors::L1iAggressor, plugins::PerfCounterPlugin, report::PlainReporter,
    AggressorRunner, Clock, Intensity, Iterations,
};

/// Walks the whole intensity ladder, each level should take about twice as long as the previous one.
fn run_ladder() {
    let mut runner = AggressorRunner::new(Clock::wall());
    runner
        .get_event_manager()
        .add_listener_if_absent(PerfCounterPlugin::default())
        .add_listener_if_absent(PlainReporter::new().verbose(true));

    for intensity in Intensity::all() {
        let aggressor = L1iAggressor::with(intensity, Iterations::Finite(100));
        aggressor.run(&mut runner);
    }
}

fn main() {
    run_ladder();
}
