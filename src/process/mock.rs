use crate::error::Result;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use std::sync::Mutex;

/// Command runner for testing without spawning processes
///
/// Every invocation is recorded. Outputs are scripted by matching the
/// command line prefix; unmatched commands succeed with empty output.
#[derive(Default)]
pub struct RecordingRunner {
    responses: Vec<(Vec<String>, CommandOutput)>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    /// Create a runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for commands starting with `prefix` (program first)
    pub fn respond(mut self, prefix: &[&str], output: CommandOutput) -> Self {
        self.responses
            .push((prefix.iter().map(|s| s.to_string()).collect(), output));
        self
    }

    /// All recorded invocations, oldest first
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Recorded invocations rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }

        let line: Vec<&str> = std::iter::once(spec.program.as_str())
            .chain(spec.args.iter().map(String::as_str))
            .collect();

        let output = self
            .responses
            .iter()
            .find(|(prefix, _)| {
                prefix.len() <= line.len() && prefix.iter().zip(&line).all(|(p, l)| p == l)
            })
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls() {
        let runner = RecordingRunner::new();
        let spec = CommandSpec::new("docker", ".").args(["pull", "repo:1.0.0"]);
        assert!(runner.run(&spec).unwrap().success());
        assert_eq!(runner.command_lines(), vec!["docker pull repo:1.0.0"]);
    }

    #[test]
    fn test_scripted_response_by_prefix() {
        let runner = RecordingRunner::new()
            .respond(&["docker", "pull"], CommandOutput::failed(1, "not found"));
        let pull = CommandSpec::new("docker", ".").args(["pull", "repo:1.0.0"]);
        let push = CommandSpec::new("docker", ".").args(["push", "repo:1.0.0"]);
        assert_eq!(runner.run(&pull).unwrap().code, Some(1));
        assert!(runner.run(&push).unwrap().success());
    }
}
