use clap::Parser as ClapParser;
use log::LevelFilter;
use occ::driver::{Cli, CompilerDriver, DriverError};
use std::process::exit;

/// The main entry point for the application.
///
/// Parses command-line arguments and runs the compiler. Any error or
/// diagnostic makes the process exit with status 1.
fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    if let Err(error) = run(cli) {
        match error {
            // already flushed to stderr, one line each
            DriverError::CompilationFailed(count) => log::debug!("{} errors", count),
            error => eprintln!("{}", error),
        }
        exit(1);
    }
}

fn run(cli: Cli) -> Result<(), DriverError> {
    let mut driver = CompilerDriver::new(cli)?;
    for path in driver.run()? {
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
