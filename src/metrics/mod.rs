//! OS counter readers.
//!
//! Each reader is a single parse of one procfs file or one command. Errors
//! never escape: an unreadable source yields the reader's fallback value.

use std::fs;
use std::path::PathBuf;

use crate::command::CommandRunner;

pub mod parse;

pub const DEFAULT_PROC_ROOT: &str = "/proc";
pub const DEFAULT_DISK_PATH: &str = "/";
pub const TEMP_FALLBACK: &str = "N/A";
pub const IP_FALLBACK: &str = "No IP";

/// Reads host counters from a procfs root, a mount point and a command
/// runner; all three are swappable for tests.
pub struct SystemReader<R: CommandRunner> {
    proc_root: PathBuf,
    disk_path: PathBuf,
    runner: R,
}

impl<R: CommandRunner> SystemReader<R> {
    pub fn new(runner: R) -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
            runner,
        }
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    /// CPU busy percent since boot; 0 on failure.
    pub fn cpu_info(&self) -> f32 {
        self.read_proc("stat")
            .and_then(|raw| parse::cpu_busy_percent(&raw))
            .unwrap_or(0.0)
    }

    /// Memory used percent; 0 on failure.
    pub fn memory_info(&self) -> f32 {
        self.read_proc("meminfo")
            .and_then(|raw| parse::memory_used_percent(&raw))
            .unwrap_or(0.0)
    }

    /// Used percent of the filesystem holding the disk path; 0 on failure.
    pub fn disk_info(&self) -> f32 {
        match rustix::fs::statvfs(self.disk_path.as_path()) {
            Ok(stat) => parse::disk_used_percent(stat.f_blocks, stat.f_bfree),
            Err(_) => 0.0,
        }
    }

    /// Seconds since boot; 0 on failure.
    pub fn uptime(&self) -> f64 {
        self.read_proc("uptime")
            .and_then(|raw| parse::first_field(&raw))
            .unwrap_or(0.0)
    }

    /// One-minute load average; 0 on failure.
    pub fn load_average(&self) -> f64 {
        self.read_proc("loadavg")
            .and_then(|raw| parse::first_field(&raw))
            .unwrap_or(0.0)
    }

    /// SoC temperature such as `48.3°C`, or `N/A`.
    pub fn cpu_temp(&self) -> String {
        self.runner
            .run("vcgencmd", &["measure_temp"])
            .and_then(|out| parse::vcgencmd_temp(&out))
            .map(|celsius| format!("{celsius:.1}°C"))
            .unwrap_or_else(|| TEMP_FALLBACK.to_string())
    }

    /// First local address, or `No IP`.
    pub fn ip_address(&self) -> String {
        self.runner
            .run("hostname", &["-I"])
            .and_then(|out| parse::first_address(&out))
            .unwrap_or_else(|| IP_FALLBACK.to_string())
    }

    fn read_proc(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.proc_root.join(name)).ok()
    }
}
