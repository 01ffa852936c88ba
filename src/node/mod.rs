//! Node access: the only place the gateway touches the outside world.
//!
//! The node's command-line front-end is treated as an opaque executor with a
//! fixed vocabulary of verbs and positional arguments. Each invocation is
//! executed via structured args (never shell), with timeout-kill semantics.

pub mod harness;
pub mod invocation;
#[cfg(test)]
pub(crate) mod stub;

pub use harness::{CommandExecutor, ProcessExecutor};
pub use invocation::{CommandInvocation, CommandResult};
