use thiserror::Error;

/// Longest raw line, in characters, that is still considered for execution.
pub const MAX_LINE_LEN: usize = 512;

/// Most argument tokens a command may carry. One more slot is reserved for the
/// null terminator of the argument vector handed to `execv`.
pub const MAX_TOKENS: usize = 99;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("line is {0} characters long")]
    TooLong(usize),
    #[error("line has {0} tokens")]
    TooManyTokens(usize),
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

/// Splits `line` on runs of whitespace. Leading and trailing whitespace are
/// dropped and a blank line produces no tokens at all.
pub fn tokenize(line: &str) -> Result<Vec<String>, LineError> {
    let tokens: Vec<String> = line
        .split(is_separator)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    check_token_count(&tokens)?;
    Ok(tokens)
}

pub(crate) fn check_token_count(tokens: &[String]) -> Result<(), LineError> {
    if tokens.len() > MAX_TOKENS {
        return Err(LineError::TooManyTokens(tokens.len()));
    }
    Ok(())
}

/// One line of input together with its tokenized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    raw: String,
    tokens: Vec<String>,
    over_length: Option<LineError>,
}

impl CommandLine {
    /// Length is checked before tokenizing; an over-length line keeps no tokens.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let len = raw.chars().count();
        if len > MAX_LINE_LEN {
            return CommandLine {
                raw,
                tokens: Vec::new(),
                over_length: Some(LineError::TooLong(len)),
            };
        }

        match tokenize(&raw) {
            Ok(tokens) => CommandLine {
                raw,
                tokens,
                over_length: None,
            },
            Err(e) => CommandLine {
                raw,
                tokens: Vec::new(),
                over_length: Some(e),
            },
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub fn is_over_length(&self) -> bool {
        self.over_length.is_some()
    }

    pub fn over_length(&self) -> Option<&LineError> {
        self.over_length.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        !self.is_over_length() && self.tokens.is_empty()
    }

    /// The text echoed in batch mode: the raw line, cut at `MAX_LINE_LEN`
    /// characters.
    pub fn echo_text(&self) -> &str {
        match self.raw.char_indices().nth(MAX_LINE_LEN) {
            Some((idx, _)) => &self.raw[..idx],
            None => &self.raw,
        }
    }
}
