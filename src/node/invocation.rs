//! The transient values passed across the executor seam.

use std::fmt;

use crate::registry::Program;

/// One node command about to run: a verb plus positional arguments, each a
/// separate argv token. Never joined into a shell string.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: Program,
    pub verb: String,
    pub args: Vec<String>,
    /// When set, `Debug` and `display_line` hide the arguments.
    pub sensitive: bool,
}

impl CommandInvocation {
    /// The full argv after the executable: verb first, then arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.verb.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Shell-quoted rendering for logs, e.g. `getblockhash '1000'`.
    ///
    /// Only ever used for display; the executor passes `argv()` directly.
    pub fn display_line(&self) -> String {
        if self.sensitive {
            return format!("{} [{} redacted args]", self.verb, self.args.len());
        }
        let mut line = self.verb.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CommandInvocation");
        s.field("program", &self.program).field("verb", &self.verb);
        if self.sensitive {
            s.field("args", &format_args!("[{} redacted]", self.args.len()));
        } else {
            s.field("args", &self.args);
        }
        s.finish()
    }
}

/// Single-quote a token so the rendered line reads as one word per argument.
fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Captured outcome of one finished node command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stderr as text with surrounding whitespace removed.
    pub fn stderr_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}
