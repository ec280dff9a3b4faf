//! Tool session configuration from TOML (`[session]` section)

use crate::rpc::error::Result;
use crate::session::{LaunchSpec, SessionOptions};
use dbassist_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw tool session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Tool server command line; `None` re-runs this binary with `serve`
    pub command: Option<Vec<String>>,
    /// Extra arguments appended to the command
    pub args: Vec<String>,
    pub handshake_timeout_secs: u64,
    pub invoke_timeout_secs: u64,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            handshake_timeout_secs: 10,
            invoke_timeout_secs: 30,
        }
    }
}

impl FileSessionConfig {
    pub fn options(&self) -> SessionOptions {
        SessionOptions {
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            invoke_timeout: Duration::from_secs(self.invoke_timeout_secs),
            ..SessionOptions::default()
        }
    }

    pub fn launch_spec(&self) -> Result<LaunchSpec> {
        let spec = match &self.command {
            Some(parts) => LaunchSpec::from_command_line(parts)?,
            None => LaunchSpec::current_exe_serve()?,
        };
        Ok(spec.with_args(self.args.iter().cloned()))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("session.handshake_timeout_secs", self.handshake_timeout_secs),
            ("session.invoke_timeout_secs", self.invoke_timeout_secs),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout,
                    format!("{} cannot be 0", field),
                ));
            }
        }
        issues
    }
}
