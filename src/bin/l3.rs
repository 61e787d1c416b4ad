use aggressor::{L3Config, Result};
use yansi::Paint;

fn run(config: L3Config) -> Result<()> {
    let mut aggressor = config.aggressor()?;
    let mut runner = config.output.runner()?;
    aggressor.run(&mut runner);
    Ok(())
}

fn main() {
    pretty_env_logger::init();
    let config = L3Config::from_args();
    if let Err(err) = run(config) {
        eprintln!("{}", err.to_string().red());
        std::process::exit(1);
    }
}
