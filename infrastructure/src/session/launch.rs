//! How to start the tool server process.

use crate::rpc::error::{Result, SessionError};
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Program and arguments for the tool server child.
///
/// The child speaks the session protocol on its stdin/stdout; its stderr is
/// inherited so server-side logs reach the operator's terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Re-run the current executable in `serve` mode.
    pub fn current_exe_serve() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| SessionError::SpawnError(format!("cannot locate own executable: {}", e)))?;
        Ok(Self::new(exe).with_arg("serve"))
    }

    /// Build from a configured command line (`["program", "arg", ...]`).
    pub fn from_command_line(parts: &[String]) -> Result<Self> {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| SessionError::SpawnError("empty tool server command".into()))?;
        Ok(Self::new(program).with_args(args.iter().cloned()))
    }

    /// Tokio command with piped stdio, ready to spawn.
    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Linux: the kernel sends SIGTERM to the server if we die first.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
