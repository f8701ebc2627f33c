use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

pub const LOG_LEVEL_ENV: &str = "STATUSPANEL_LOG_LEVEL";

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl FromStr for LogLevel {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

/// Levelled stderr logger.
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// `level` applies unless `STATUSPANEL_LOG_LEVEL` names a valid level.
    pub fn new(level: LogLevel) -> Self {
        let env_level = std::env::var(LOG_LEVEL_ENV).ok();
        Self {
            level: effective_level(level, env_level.as_deref()),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: LogLevel, msg: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f32())
            .unwrap_or(0.0);
        eprintln!("[{ts:.3}] [{level:?}] {}", msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Info, msg);
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Debug, msg);
    }
}

fn effective_level(requested: LogLevel, env: Option<&str>) -> LogLevel {
    env.and_then(|raw| LogLevel::from_str(raw.trim()).ok())
        .unwrap_or(requested)
}
