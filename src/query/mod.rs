//! Query invocation: parameters, execution modes and the runner.

mod runner;

pub use runner::{ExecutionMode, Invocation, QueryOutput, QueryRunner, DEFAULT_QUERY_TIMEOUT_SECS};
