use std::fs::File;
use std::io::{self, BufReader};

use tracing::debug;

use crate::cli::Invocation;
use crate::config::Config;
use crate::error::ShellError;
use crate::executor::DefaultExecutor;
use crate::io::{InputStream, LineSource, Mode};
use crate::prompt::ShellPrompt;
use crate::session::Session;

/// Runs a whole session for `invocation` on the process's own stdio and
/// closes its input afterwards, whether or not the session failed.
pub fn start(invocation: Invocation, config: &Config) -> Result<(), ShellError> {
    let prompt = ShellPrompt::new(config.prompt.clone());
    match invocation {
        Invocation::Interactive => {
            let source = LineSource::new(io::stdin().lock(), Mode::Interactive, prompt);
            drive(source, config)
        }
        Invocation::Batch(path) => {
            let file = File::open(&path).map_err(|source| ShellError::BatchOpen {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "opened batch file");
            let source = LineSource::new(BufReader::new(file), Mode::Batch, prompt);
            drive(source, config)
        }
    }
}

fn drive<R: InputStream>(source: LineSource<R>, config: &Config) -> Result<(), ShellError> {
    let mut session = Session::new(
        source,
        io::stdout(),
        io::stderr(),
        config.alias_table(),
        DefaultExecutor,
    );
    let result = session.run();
    let closed = session.close();
    result.and(closed)
}
