use std::fmt;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::alias::AliasTable;
use crate::error::ShellError;
use crate::executor::{DispatchOutcome, ExecError, Executor};
use crate::io::{InputStream, LineSource, Mode, NextLine};
use crate::redirect::{extract_redirection, Redirected};
use crate::tokenizer::{check_token_count, CommandLine, MAX_LINE_LEN};

/// The only built-in. Anything after it on the line is ignored.
pub const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
}

/// Drives read, tokenize, alias, redirect and dispatch until `exit` or end of
/// input. Owns the input stream; prompts, echoes and the long-line warning go to
/// `out`, other diagnostics to `err`.
pub struct Session<R, W, E, X> {
    source: LineSource<R>,
    out: W,
    err: E,
    aliases: AliasTable,
    executor: X,
    state: SessionState,
}

impl<R, W, E, X> Session<R, W, E, X>
where
    R: InputStream,
    W: Write,
    E: Write,
    X: Executor,
{
    pub fn new(source: LineSource<R>, out: W, err: E, aliases: AliasTable, executor: X) -> Self {
        Session {
            source,
            out,
            err,
            aliases,
            executor,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.source.mode()
    }

    /// Loops until the session terminates. Per-command failures are reported
    /// and skipped; only I/O failures on the shell's own streams and a lost
    /// child end the loop with an error.
    pub fn run(&mut self) -> Result<(), ShellError> {
        info!(mode = ?self.mode(), aliases = self.aliases.len(), "session started");
        while self.state == SessionState::Running {
            if let Err(e) = self.step() {
                self.state = SessionState::Terminated;
                return Err(e);
            }
        }
        info!("session terminated");
        Ok(())
    }

    /// One full cycle: read a line, echo it in batch mode, then run it.
    pub fn step(&mut self) -> Result<(), ShellError> {
        let line = match self.source.next_line(&mut self.out)? {
            NextLine::Line(line) => line,
            NextLine::EndOfInput => {
                debug!("end of input");
                self.state = SessionState::Terminated;
                return Ok(());
            }
        };

        let cmd = CommandLine::new(line);
        if self.mode() == Mode::Batch {
            writeln!(self.out, "{}", cmd.echo_text())?;
            self.out.flush()?;
        }
        self.execute(cmd)
    }

    fn execute(&mut self, cmd: CommandLine) -> Result<(), ShellError> {
        if let Some(reason) = cmd.over_length() {
            debug!(%reason, "ignoring over-length line");
            return self.warn_long_line();
        }

        let tokens = self.aliases.resolve(cmd.into_tokens());
        if tokens.is_empty() {
            return Ok(());
        }
        if tokens[0] == EXIT_COMMAND {
            debug!("exit requested");
            self.state = SessionState::Terminated;
            return Ok(());
        }
        if let Err(reason) = check_token_count(&tokens) {
            debug!(%reason, "alias expansion exceeds the token limit");
            return self.warn_long_line();
        }

        let Redirected { argv, stdout } = match extract_redirection(tokens) {
            Ok(redirected) => redirected,
            Err(e) => {
                debug!(error = %e, "bad redirection");
                return self.report(format_args!("Redirection misformatted."));
            }
        };
        debug!(?argv, ?stdout, "dispatching");

        // Nothing may sit in a buffer when the child is forked.
        self.out.flush()?;
        self.err.flush()?;

        match self.executor.dispatch(&argv, stdout.as_deref()) {
            Ok(DispatchOutcome::Completed(code)) => {
                debug!(code, "command completed");
                Ok(())
            }
            Ok(DispatchOutcome::CommandNotFound(name)) => {
                self.report(format_args!("{}: Command not found.", name))
            }
            Err(ExecError::Redirect { path, source }) => {
                warn!(path = %path.display(), error = %source, "cannot open redirection target");
                self.report(format_args!("Error: Cannot open file {}.", path.display()))
            }
            Err(e) if e.is_fatal() => Err(ShellError::Exec(e)),
            Err(e) => {
                warn!(error = %e, "command failed to start");
                self.report(format_args!("mysh: {}", e))
            }
        }
    }

    fn warn_long_line(&mut self) -> Result<(), ShellError> {
        writeln!(
            self.out,
            "warning: ignoring long command exceeding {} characters",
            MAX_LINE_LEN
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn report(&mut self, msg: fmt::Arguments<'_>) -> Result<(), ShellError> {
        self.err.write_fmt(msg)?;
        writeln!(self.err)?;
        self.err.flush()?;
        Ok(())
    }

    /// Closes the input stream. Consumes the session so this happens once.
    pub fn close(mut self) -> Result<(), ShellError> {
        self.out.flush()?;
        self.source.close().map_err(ShellError::Close)
    }
}
