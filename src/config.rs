use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::alias::{self, AliasTable};
use crate::prompt::DEFAULT_PROMPT;

/// Environment variable naming the config file. Unset means built-in defaults.
pub const CONFIG_ENV: &str = "MYSH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub aliases: HashMap<String, String>,
}

impl Config {
    pub fn alias_table(&self) -> AliasTable {
        self.aliases.iter().collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            aliases: HashMap::new(),
        }
    }

    /// Loads the file named by `MYSH_CONFIG`, or the defaults when it is unset.
    pub fn load() -> Result<Config, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default_config()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading config");
        Self::load_from_str(&src)
    }

    /// Parses `key=value` lines. Everything after the first `=` is the value,
    /// untrimmed, so a prompt may end in a space.
    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let parse_err = |msg: String| ConfigError::Parse { line: lineno, msg };
            let Some((key, value)) = line.split_once('=') else {
                return Err(parse_err(format!("no '=' found: {}", line)));
            };

            match key.trim() {
                "prompt" => config.prompt = value.to_string(),
                k if k.starts_with("alias.") => {
                    let name = k.trim_start_matches("alias.");
                    if name.is_empty() || name.contains(char::is_whitespace) {
                        return Err(parse_err(format!("invalid alias name: {:?}", name)));
                    }
                    if alias::is_reserved(name) {
                        return Err(parse_err(format!("too dangerous to alias {:?}", name)));
                    }
                    config.aliases.insert(name.to_string(), value.trim().to_string());
                }
                k => return Err(parse_err(format!("unknown key: {}", k))),
            }
        }

        Ok(config)
    }
}
