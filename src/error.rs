use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cli::CliError;
use crate::config::ConfigError;
use crate::executor::ExecError;

/// Errors that end the program. Their `Display` text is what the user sees on
/// stderr; every one of them exits with status 1.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error("Error: Cannot open file {}.", path.display())]
    BatchOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mysh: config: {0}")]
    Config(#[from] ConfigError),
    #[error("mysh: {0}")]
    Io(#[from] io::Error),
    #[error("mysh: {0}")]
    Exec(#[source] ExecError),
    #[error("Error: while closing file: {0}")]
    Close(#[source] io::Error),
}

impl ShellError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ShellError::from(CliError::Usage).to_string(),
            "Usage: mysh [batch-file]"
        );
        let err = ShellError::BatchOpen {
            path: PathBuf::from("missing.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Error: Cannot open file missing.txt.");
        assert_eq!(err.exit_code(), 1);
    }
}
