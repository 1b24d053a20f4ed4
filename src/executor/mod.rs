mod executor;
mod default_executor;


pub use executor::{DispatchOutcome, ExecError, ExecStatus, Executor};
pub use default_executor::{ArgVector, DefaultExecutor};
