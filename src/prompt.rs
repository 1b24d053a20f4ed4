use std::io::{self, Write};

pub const DEFAULT_PROMPT: &str = "mysh> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPrompt {
    text: String,
}

impl ShellPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        ShellPrompt { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Writes the prompt and flushes so it is visible before the read blocks.
    pub fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.text.as_bytes())?;
        out.flush()
    }
}

impl Default for ShellPrompt {
    fn default() -> Self {
        ShellPrompt::new(DEFAULT_PROMPT)
    }
}
