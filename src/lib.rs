pub mod alias;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod prompt;
pub mod redirect;
pub mod repl;
pub mod session;
pub mod tokenizer;

pub use error::ShellError;
