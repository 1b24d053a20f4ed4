pub mod input;

pub use input::{InputStream, LineSource, Mode, NextLine};
