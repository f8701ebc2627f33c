use std::cell::RefCell;
use std::collections::HashMap;

use super::CommandRunner;

/// Scripted [`CommandRunner`] for tests: maps a full command line to its
/// stdout and records every invocation.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `command_line` (program and args joined by single spaces).
    pub fn with(mut self, command_line: &str, stdout: &str) -> Self {
        self.outputs
            .insert(command_line.to_string(), stdout.to_string());
        self
    }

    pub fn set(&mut self, command_line: &str, stdout: &str) {
        self.outputs
            .insert(command_line.to_string(), stdout.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, command_line: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.as_str() == command_line)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push(line.clone());
        self.outputs
            .get(&line)
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_runner_answers_and_counts() {
        let runner = ScriptedRunner::new().with("iw dev", "Interface wlan0\n");
        assert_eq!(runner.run("iw", &["dev"]).as_deref(), Some("Interface wlan0"));
        assert_eq!(runner.run("iwgetid", &["-r"]), None);
        assert_eq!(runner.call_count("iw dev"), 1);
        assert_eq!(runner.calls(), vec!["iw dev", "iwgetid -r"]);
    }

    #[test]
    fn blank_output_is_no_data() {
        let runner = ScriptedRunner::new().with("hostname -I", "   \n");
        assert_eq!(runner.run("hostname", &["-I"]), None);
    }
}
