use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// What became of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The program ran; holds its exit status, or `128 + signal` if it was killed.
    Completed(i32),
    /// The program image could not be replaced (missing, not executable, ...).
    CommandNotFound(String),
}

pub type ExecStatus = Result<DispatchOutcome, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no command to run")]
    EmptyCommand,
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),
    #[error("cannot create status pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),
    #[error("cannot open {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("waiting for process {pid} failed: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: nix::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ExecError {
    /// A failed `waitpid` means the shell lost track of its own child, so the
    /// session cannot safely go on. Everything else only affects one command.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Wait { .. })
    }
}

pub trait Executor {
    /// Runs `argv[0]` with `argv` as its argument vector, stdout optionally sent
    /// to `stdout`, and returns once the program has finished.
    fn dispatch(&mut self, argv: &[String], stdout: Option<&Path>) -> ExecStatus;
}

impl<X: Executor + ?Sized> Executor for &mut X {
    fn dispatch(&mut self, argv: &[String], stdout: Option<&Path>) -> ExecStatus {
        (**self).dispatch(argv, stdout)
    }
}
