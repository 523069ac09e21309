//! A CommandRunner that records every command and answers from a script.

use async_trait::async_trait;
use dk_core::executor::base::{CommandRunner, ExecError, ExecEvent, ExecStream};
use dk_core::executor::command::CommandSpec;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Rule {
    /// Matched against `CommandSpec::command_line()`.
    needle: String,
    exit_code: i32,
    output: Vec<String>,
}

/// Records commands and replies with scripted output and exit codes.
///
/// Commands without a matching rule print nothing and exit 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    rules: Vec<Rule>,
    missing: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands whose command line contains `needle` exit with `exit_code`.
    pub fn exit_with(mut self, needle: &str, exit_code: i32, output: &[&str]) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            exit_code,
            output: output.iter().map(|line| line.to_string()).collect(),
        });
        self
    }

    /// Commands whose command line contains `needle` print `output` and succeed.
    pub fn respond(self, needle: &str, output: &[&str]) -> Self {
        self.exit_with(needle, 0, output)
    }

    /// `program` is reported as unavailable.
    pub fn without(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Every command executed so far, as argv lists.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Executed command lines, for readable assertions.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|argv| argv.join(" ")).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn is_available(&self, spec: &CommandSpec) -> bool {
        !self.missing.contains(&spec.program)
    }

    fn execute(&self, spec: &CommandSpec) -> ExecStream {
        self.calls
            .lock()
            .unwrap()
            .push(spec.argv().into_iter().map(str::to_string).collect());

        if self.missing.contains(&spec.program) {
            let program = spec.program.clone();
            return Box::pin(async_stream::stream! {
                yield Err(ExecError::NotFound(program));
            });
        }

        let command_line = spec.command_line();
        let rule = self
            .rules
            .iter()
            .find(|rule| command_line.contains(&rule.needle))
            .cloned();

        Box::pin(async_stream::stream! {
            let (exit_code, output) = match rule {
                Some(rule) => (rule.exit_code, rule.output),
                None => (0, Vec::new()),
            };
            for line in output {
                yield Ok(ExecEvent::Stdout(line));
            }
            yield Ok(ExecEvent::Exited(Some(exit_code)));
        })
    }
}
