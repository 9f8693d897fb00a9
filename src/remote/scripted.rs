//! Canned executor for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CommandOutput, RemoteExecutor};
use crate::error::AppError;

/// Answers commands from a list of `(substring, output)` rules and records
/// every call. Unmatched commands fail like an unreachable device.
#[derive(Default)]
pub struct ScriptedRemote {
    rules: Vec<(String, CommandOutput)>,
    pub commands: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<(String, String)>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `pattern` succeed with `stdout`.
    pub fn ok(self, pattern: &str, stdout: &str) -> Self {
        self.rule(pattern, CommandOutput::from_exit(stdout.to_string(), String::new(), 0))
    }

    /// Commands containing `pattern` exit with `code` and `stderr`.
    pub fn fail(self, pattern: &str, code: i32, stderr: &str) -> Self {
        self.rule(pattern, CommandOutput::from_exit(String::new(), stderr.to_string(), code))
    }

    fn rule(mut self, pattern: &str, output: CommandOutput) -> Self {
        self.rules.push((pattern.to_string(), output));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedRemote {
    async fn execute(&self, command: &str, _timeout: Option<Duration>) -> CommandOutput {
        self.commands.lock().unwrap().push(command.to_string());
        self.rules
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::failure("device unreachable"))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AppError> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_string(), content.to_string()));
        Ok(())
    }
}
