use aggressor::{L1iConfig, Result};
use yansi::Paint;

fn run(config: L1iConfig) -> Result<()> {
    let aggressor = config.aggressor()?;
    let mut runner = config.output.runner()?;
    aggressor.run(&mut runner);
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let config = L1iConfig::from_args();
    if let Err(err) = run(config) {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
