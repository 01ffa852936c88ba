//! Recording stub executor for tests.
//!
//! Replies are scripted per verb; every invocation is recorded so tests can
//! assert that a request never reached the node.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use crate::error::GatewayError;
use crate::node::harness::CommandExecutor;
use crate::node::invocation::{CommandInvocation, CommandResult};

#[derive(Debug, Clone)]
pub enum StubReply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Timeout,
    LaunchFailure,
}

impl StubReply {
    pub fn ok(stdout: &str) -> Self {
        StubReply::Exit {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        StubReply::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[derive(Default)]
pub struct StubExecutor {
    replies: HashMap<String, StubReply>,
    calls: Mutex<Vec<(CommandInvocation, Duration)>>,
}

impl StubExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, verb: &str, reply: StubReply) -> Self {
        self.replies.insert(verb.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(inv, _)| inv.clone())
            .collect()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandExecutor for StubExecutor {
    fn execute<'a>(
        &'a self,
        invocation: &'a CommandInvocation,
        timeout: Duration,
    ) -> BoxFuture<'a, crate::Result<CommandResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((invocation.clone(), timeout));
        let reply = self
            .replies
            .get(&invocation.verb)
            .cloned()
            .unwrap_or_else(|| StubReply::ok(""));
        let verb = invocation.verb.clone();
        async move {
            match reply {
                StubReply::Exit {
                    code,
                    stdout,
                    stderr,
                } => Ok(CommandResult {
                    exit_code: Some(code),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                }),
                StubReply::Timeout => Err(GatewayError::ExecutionTimeout { verb, timeout }),
                StubReply::LaunchFailure => Err(GatewayError::Launch {
                    program: "bitcoin-cli".to_string(),
                    reason: "No such file or directory (os error 2)".to_string(),
                }),
            }
        }
        .boxed()
    }
}
