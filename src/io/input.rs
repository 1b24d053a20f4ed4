use std::fs::File;
use std::io::{self, BufRead, BufReader, StdinLock, Write};
use std::os::unix::io::IntoRawFd;

use crate::prompt::ShellPrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Commands come from a terminal; a prompt precedes every read.
    Interactive,
    /// Commands come from a file; every line is echoed before it runs.
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLine {
    /// One line without its trailing newline. May be empty.
    Line(String),
    EndOfInput,
}

/// A line-oriented input the session owns and closes on shutdown.
pub trait InputStream: BufRead {
    fn close(self) -> io::Result<()>;
}

impl InputStream for BufReader<File> {
    /// Closes the descriptor explicitly so a failing `close(2)` is reported
    /// instead of being swallowed by `Drop`.
    fn close(self) -> io::Result<()> {
        let fd = self.into_inner().into_raw_fd();
        nix::unistd::close(fd).map_err(io::Error::from)
    }
}

impl InputStream for StdinLock<'static> {
    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

impl InputStream for &[u8] {
    fn close(self) -> io::Result<()> {
        Ok(())
    }
}

pub struct LineSource<R> {
    reader: R,
    mode: Mode,
    prompt: ShellPrompt,
}

impl<R: InputStream> LineSource<R> {
    pub fn new(reader: R, mode: Mode, prompt: ShellPrompt) -> Self {
        LineSource {
            reader,
            mode,
            prompt,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Reads the next line. A blank line is `Line("")`; only a read of zero
    /// bytes is `EndOfInput`. Invalid UTF-8 is replaced, not rejected.
    pub fn next_line<W: Write>(&mut self, out: &mut W) -> io::Result<NextLine> {
        if self.mode == Mode::Interactive {
            self.prompt.show(out)?;
        }

        let mut buf = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            if self.mode == Mode::Interactive {
                // EOF (e.g. Ctrl-D) leaves the cursor after the prompt
                writeln!(out)?;
                out.flush()?;
            }
            return Ok(NextLine::EndOfInput);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(NextLine::Line(String::from_utf8_lossy(&buf).into_owned()))
    }

    pub fn close(self) -> io::Result<()> {
        self.reader.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(input: &'static [u8]) -> LineSource<&'static [u8]> {
        LineSource::new(input, Mode::Batch, ShellPrompt::default())
    }

    #[test]
    fn test_blank_line_is_not_end_of_input() {
        let mut src = batch(b"\n\n/bin/ls\n");
        let mut out = Vec::new();
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line(String::new()));
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line(String::new()));
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line("/bin/ls".into()));
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::EndOfInput);
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::EndOfInput);
        assert!(out.is_empty());
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut src = batch(b"/bin/echo a\n/bin/echo b");
        let mut out = Vec::new();
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line("/bin/echo a".into()));
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line("/bin/echo b".into()));
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::EndOfInput);
    }

    #[test]
    fn test_interactive_prompts_before_each_read() {
        let mut src = LineSource::new(&b"/bin/ls\n"[..], Mode::Interactive, ShellPrompt::new("$ "));
        let mut out = Vec::new();
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line("/bin/ls".into()));
        assert_eq!(out, b"$ ");
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::EndOfInput);
        assert_eq!(out, b"$ $ \n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut src = batch(b"/bin/echo \xff\n");
        let mut out = Vec::new();
        assert_eq!(
            src.next_line(&mut out).unwrap(),
            NextLine::Line("/bin/echo \u{fffd}".into())
        );
    }

    #[test]
    fn test_close_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch");
        std::fs::write(&path, "exit\n").unwrap();
        let file = File::open(&path).unwrap();
        let mut src = LineSource::new(BufReader::new(file), Mode::Batch, ShellPrompt::default());
        let mut out = Vec::new();
        assert_eq!(src.next_line(&mut out).unwrap(), NextLine::Line("exit".into()));
        assert!(src.close().is_ok());
    }
}
