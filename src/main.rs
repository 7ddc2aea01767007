use clitools::cli::{self, Options, USAGE};
use clitools::core::db::ConnectionManager;
use clitools::core::{ClitoolsError, Result};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: &Options) -> Result<()> {
    let config = options.resolve_config()?;

    let level = if options.verbose {
        "debug".to_string()
    } else {
        config
            .logging
            .as_ref()
            .and_then(|logging| logging.level.clone())
            .unwrap_or_else(|| "warn".to_string())
    };
    init_logging(&level);

    let Some(command) = &options.command else {
        return Err(ClitoolsError::Usage("no command given".to_string()));
    };

    let mut manager = ConnectionManager::new();
    config.database.apply(&mut manager)?;
    debug!(?command, "running command");

    let stdout = std::io::stdout();
    cli::execute(&mut manager, command, &mut stdout.lock())
}

fn main() -> ExitCode {
    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ ClitoolsError::Usage(_)) => {
            eprintln!("{}\n\n{}", e, USAGE);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
