//! Bounded external command execution.
//!
//! Every probe that shells out goes through [`CommandRunner`] so a hung or
//! missing utility costs at most one timeout, and so tests can script the
//! output without spawning anything.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub mod fake;

pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 400;
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs a program and returns its trimmed stdout.
///
/// `None` covers every failure: missing binary, non-zero exit, timeout,
/// empty output. Callers treat all of them as "no data from this source".
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        (**self).run(program, args)
    }
}

/// Spawns real processes, killing any that outlive `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;

        // Drain stdout while the child runs; a chatty child would otherwise
        // block on a full pipe and be killed at the timeout.
        let reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut out = Vec::new();
                let _ = stdout.read_to_end(&mut out);
                out
            })
        });

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        return None;
                    }
                    let out = reader.and_then(|r| r.join().ok()).unwrap_or_default();
                    let text = String::from_utf8_lossy(&out).trim().to_string();
                    return if text.is_empty() { None } else { Some(text) };
                }
                Ok(None) => {
                    if start.elapsed() >= self.timeout {
                        // The reader is left detached: a grandchild may still
                        // hold the pipe open after the kill.
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_no_data() {
        let runner = SystemRunner::default();
        assert_eq!(runner.run("statuspanel-definitely-not-installed", &[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn captures_trimmed_stdout() {
        let runner = SystemRunner::default();
        assert_eq!(runner.run("echo", &["  hello  "]).as_deref(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_no_data() {
        let runner = SystemRunner::default();
        assert_eq!(runner.run("false", &[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_is_killed_at_timeout() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let start = Instant::now();
        assert_eq!(runner.run("sleep", &["5"]), None);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn output_larger_than_a_pipe_buffer_is_captured() {
        let runner = SystemRunner::new(Duration::from_secs(2));
        let out = runner.run("seq", &["1", "50000"]).unwrap();
        assert!(out.starts_with("1\n2\n"));
        assert!(out.ends_with("\n50000"));
        assert_eq!(out.lines().count(), 50000);
    }
}
