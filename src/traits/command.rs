use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Trait for launching external programs, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command interactively (inherits stdin/stdout/stderr)
    fn execute_interactive(&self, command: &str, args: &[&str]) -> Result<i32>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn execute_interactive(&self, command: &str, args: &[&str]) -> Result<i32> {
        tracing::debug!(command, ?args, "launching interactive command");

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to launch '{}'", command))?;

        let status = child.wait()?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    exit_code: i32,
    invocations: std::sync::Mutex<Vec<(String, Vec<String>)>>,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::with_exit_code(0)
    }

    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            invocations: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Commands launched so far, with their arguments
    pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute_interactive(&self, command: &str, args: &[&str]) -> Result<i32> {
        self.invocations.lock().unwrap().push((
            command.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        Ok(self.exit_code)
    }
}
