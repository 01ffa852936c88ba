//! Node harness: spawns the node's command-line front-end with timeout-kill
//! and captures its output.
//!
//! `CommandExecutor` is the seam between the dispatcher and the outside world;
//! `ProcessExecutor` is the real implementation. The process is started via
//! `tokio::process::Command` with structured args (never a shell) and
//! `kill_on_drop`, so a request that is abandoned mid-flight also takes its
//! child down with it.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::config::{resolve_env_vars, NodeConfig};
use crate::error::GatewayError;
use crate::node::invocation::{CommandInvocation, CommandResult};
use crate::registry::Program;

/// How long pipes are still read after the child exits.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Runs one node command to completion or until `timeout` elapses.
///
/// Implementations must not retry: node commands (e.g. broadcasting a
/// transaction) are not safe to repeat blindly.
pub trait CommandExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        invocation: &'a CommandInvocation,
        timeout: Duration,
    ) -> BoxFuture<'a, crate::Result<CommandResult>>;
}

/// Executes invocations as child processes of the configured node binaries.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    cli_command: String,
    daemon_command: String,
    /// Global flags placed before the verb (e.g., `-regtest`).
    global_args: Vec<String>,
    /// Resolved env vars (values already extracted from `${VAR}` references)
    env: HashMap<String, String>,
}

impl ProcessExecutor {
    /// Build an executor from node config, resolving env references once.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            cli_command: config.cli_command.clone(),
            daemon_command: config.daemon_command.clone(),
            global_args: config.args.clone(),
            env: resolve_env_vars(&config.env),
        }
    }

    fn program_path(&self, program: Program) -> &str {
        match program {
            Program::Cli => &self.cli_command,
            Program::Daemon => &self.daemon_command,
        }
    }

    async fn run(
        &self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> crate::Result<CommandResult> {
        let start = Instant::now();
        let program = self.program_path(invocation.program);

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&self.global_args);
        cmd.args(invocation.argv());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().map_err(|e| {
            tracing::warn!(
                program = %program,
                verb = %invocation.verb,
                error = %e,
                "failed to launch node command"
            );
            GatewayError::Launch {
                program: program.to_string(),
                reason: e.to_string(),
            }
        })?;

        // Take pipes so the child stays reachable for kill() on timeout.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        // Completion is the child's exit, not EOF on its pipes: a forking
        // command (`-daemon`) leaves a descendant holding them open.
        let exited = CancellationToken::new();
        let outcome = tokio::time::timeout(timeout, async {
            let wait = async {
                let status = child.wait().await;
                exited.cancel();
                status
            };
            // Drain both pipes concurrently; a full stderr pipe must not stall stdout.
            tokio::join!(
                wait,
                read_pipe(stdout_pipe, exited.clone()),
                read_pipe(stderr_pipe, exited.clone())
            )
        })
        .await;

        let (status, stdout, stderr) = match outcome {
            Ok(parts) => parts,
            Err(_elapsed) => {
                // Kill the process, not just the future.
                let _ = child.kill().await;
                tracing::warn!(
                    verb = %invocation.verb,
                    timeout_ms = %timeout.as_millis(),
                    "node command timed out and was killed"
                );
                return Err(GatewayError::ExecutionTimeout {
                    verb: invocation.verb.clone(),
                    timeout,
                });
            }
        };

        let io_error = |e: std::io::Error| GatewayError::Launch {
            program: program.to_string(),
            reason: format!("process I/O error: {}", e),
        };
        let status = status.map_err(io_error)?;
        let result = CommandResult {
            exit_code: status.code(),
            stdout: stdout.map_err(io_error)?,
            stderr: stderr.map_err(io_error)?,
        };

        tracing::info!(
            program = %program,
            invocation = %invocation.display_line(),
            exit_code = ?result.exit_code,
            duration_ms = %start.elapsed().as_millis(),
            "node command finished"
        );

        if !result.stderr.is_empty() && !invocation.sensitive {
            tracing::debug!(
                verb = %invocation.verb,
                stderr = %String::from_utf8_lossy(&result.stderr),
                "node command stderr"
            );
        }

        Ok(result)
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute<'a>(
        &'a self,
        invocation: &'a CommandInvocation,
        timeout: Duration,
    ) -> BoxFuture<'a, crate::Result<CommandResult>> {
        self.run(invocation, timeout).boxed()
    }
}

/// Read a pipe to EOF, or until `exited` fires plus [`DRAIN_GRACE`].
async fn read_pipe<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    exited: CancellationToken,
) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let Some(mut pipe) = pipe else {
        return Ok(buf);
    };

    let mut chunk = [0u8; 8192];
    loop {
        let n = tokio::select! {
            n = pipe.read(&mut chunk) => n?,
            _ = exited.cancelled() => break,
        };
        if n == 0 {
            return Ok(buf);
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    // Child is gone: take what it left in the pipe, but don't wait on
    // descendants that inherited the write end.
    match tokio::time::timeout(DRAIN_GRACE, pipe.read_to_end(&mut buf)).await {
        Ok(read) => read.map(|_| buf),
        Err(_elapsed) => Ok(buf),
    }
}
