use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use mysh::cli::Invocation;
use mysh::config::ConfigLoader;
use mysh::{repl, ShellError};

/// Filter directives for the diagnostic log, e.g. `MYSH_LOG=debug`.
const LOG_ENV: &str = "MYSH_LOG";

fn init_tracing() {
    // Off by default: stdout and stderr carry the shell's own output.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<(), ShellError> {
    let invocation = Invocation::from_args(std::env::args_os())?;
    let config = ConfigLoader::load()?;
    repl::start(invocation, &config)
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
