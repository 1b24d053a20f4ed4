use std::collections::HashMap;

use tracing::debug;

/// Names that must keep their meaning; an alias for any of them is rejected.
pub const RESERVED_NAMES: [&str; 3] = ["alias", "unalias", "exit"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Alias name to replacement tokens, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, Vec<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `name`, replacing an earlier definition. The expansion is split
    /// on whitespace the same way a command line is.
    pub fn define(&mut self, name: impl Into<String>, expansion: &str) {
        let tokens = expansion.split_whitespace().map(str::to_string).collect();
        self.entries.insert(name.into(), tokens);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the first token with its expansion. The result is not looked up
    /// again, so self-referential aliases terminate.
    pub fn resolve(&self, tokens: Vec<String>) -> Vec<String> {
        let Some(expansion) = tokens.first().and_then(|first| self.get(first)) else {
            return tokens;
        };
        debug!(alias = %tokens[0], ?expansion, "expanding alias");

        let mut resolved = Vec::with_capacity(expansion.len() + tokens.len() - 1);
        resolved.extend(expansion.iter().cloned());
        resolved.extend(tokens.into_iter().skip(1));
        resolved
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (name, expansion) in iter {
            table.define(name, expansion.as_ref());
        }
        table
    }
}
