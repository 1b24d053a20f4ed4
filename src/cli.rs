use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("Usage: mysh [batch-file]")]
    Usage,
}

/// mysh - run programs by full path, interactively or from a batch file
#[derive(Parser, Debug)]
#[command(name = "mysh", disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// File of commands to run instead of reading the terminal
    batch_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Interactive,
    Batch(PathBuf),
}

/// `-x`, `--long` and `--` count as options; a lone `-` does not.
fn is_option_like(arg: &OsStr) -> bool {
    let bytes = arg.as_bytes();
    bytes.len() > 1 && bytes[0] == b'-'
}

impl Invocation {
    /// Parses the full argv, program name included. No options are accepted.
    pub fn from_args<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.iter().skip(1).any(|a| is_option_like(a)) {
            return Err(CliError::Usage);
        }

        let parsed = Args::try_parse_from(&args).map_err(|e| {
            debug!(kind = ?e.kind(), "rejected command line");
            CliError::Usage
        })?;
        Ok(match parsed.batch_file {
            Some(path) => Invocation::Batch(path),
            None => Invocation::Interactive,
        })
    }
}
