use std::path::PathBuf;

use thiserror::Error;

pub const REDIRECT_OUT: &str = ">";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedirectError {
    #[error("more than one '>' on the line")]
    Multiple,
    #[error("'>' is not followed by a file name")]
    MissingTarget,
    #[error("tokens follow the redirection target")]
    TrailingTokens,
    #[error("nothing to run before '>'")]
    MissingCommand,
}

/// A command's arguments with any output redirection taken out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirected {
    pub argv: Vec<String>,
    pub stdout: Option<PathBuf>,
}

/// Breaks `>` out of tokens like `/bin/ls>out` so it always stands alone.
fn split_operators(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token == REDIRECT_OUT || !token.contains('>') {
            out.push(token);
            continue;
        }
        let mut rest = token.as_str();
        while let Some(idx) = rest.find('>') {
            if idx > 0 {
                out.push(rest[..idx].to_string());
            }
            out.push(REDIRECT_OUT.to_string());
            rest = &rest[idx + 1..];
        }
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
    }
    out
}

/// Separates `cmd args... > file` into the argument vector and the target
/// path. The `>` and the file name must be the last two tokens.
pub fn extract_redirection(tokens: Vec<String>) -> Result<Redirected, RedirectError> {
    let mut tokens = split_operators(tokens);

    let mut positions = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| *t == REDIRECT_OUT)
        .map(|(i, _)| i);
    let Some(at) = positions.next() else {
        return Ok(Redirected {
            argv: tokens,
            stdout: None,
        });
    };
    if positions.next().is_some() {
        return Err(RedirectError::Multiple);
    }

    match tokens.len() - at - 1 {
        0 => return Err(RedirectError::MissingTarget),
        1 => {}
        _ => return Err(RedirectError::TrailingTokens),
    }
    if at == 0 {
        return Err(RedirectError::MissingCommand);
    }

    let target = tokens.pop().map(PathBuf::from);
    tokens.truncate(at);
    Ok(Redirected {
        argv: tokens,
        stdout: target,
    })
}
