use aggressor::{MemBwConfig, Result};
use yansi::Paint;

fn run(config: MemBwConfig) -> Result<()> {
    let mut aggressor = config.aggressor()?;
    let mut runner = config.output.runner()?;
    // Warm up before the reporter prints the plan, touching 1 GiB takes a while.
    aggressor.warm_up();
    aggressor.run(&mut runner);
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let config = MemBwConfig::from_args();
    if let Err(err) = run(config) {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
