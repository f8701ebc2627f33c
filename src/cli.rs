use std::path::PathBuf;
use std::time::Duration;

use crate::app::logger::LogLevel;
use crate::config::Mode;
use crate::{Error, Result};

/// Options for the `run` command; values are `None` when not provided on CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub mode: Option<Mode>,
    pub interval: Option<Duration>,
    pub image: Option<PathBuf>,
    pub once: bool,
    pub log_level: Option<LogLevel>,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    /// Print one status snapshot as JSON and exit.
    Snapshot(RunOptions),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Command::Run(RunOptions::default()));
        }

        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            Some("run") => parse_run_options(&mut iter),
            Some("snapshot") => {
                let (opts, _) = parse_flags(&mut iter)?;
                Ok(Command::Snapshot(opts))
            }
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // `run` may be omitted: re-parse from the first flag.
                let mut iter = args.iter();
                parse_run_options(&mut iter)
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
            None => Ok(Command::Run(RunOptions::default())),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "statuspanel - host status on a 128x160 ST7735 TFT\n",
            "\n",
            "USAGE:\n",
            "  statuspanel run [--mode <mode>] [--interval <duration>] [--image <path>] [--once] [--log-level <level>]\n",
            "  statuspanel --snapshot\n",
            "  statuspanel --help\n",
            "  statuspanel --version\n",
            "\n",
            "OPTIONS:\n",
            "  --mode <mode>          system, text, image or test (default: system)\n",
            "  --interval <duration>  Refresh interval, e.g. 5s or 1m (default: 5s)\n",
            "  --image <path>         Image shown in image mode (default: display_image.png)\n",
            "  --once                 Paint a single frame and exit\n",
            "  --log-level <level>    error, warn, info, debug or trace (default: info)\n",
            "  --snapshot             Print one status reading as JSON without using the display\n",
            "  -h, --help             Show this help\n",
            "  -V, --version          Show version\n",
            "\n",
            "Settings are read from ~/.status_panel/config.toml when present.\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<Command> {
    let (opts, snapshot) = parse_flags(iter)?;
    if snapshot {
        Ok(Command::Snapshot(opts))
    } else {
        Ok(Command::Run(opts))
    }
}

fn parse_flags(iter: &mut std::slice::Iter<String>) -> Result<(RunOptions, bool)> {
    let mut opts = RunOptions::default();
    let mut snapshot = false;

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--mode" => {
                let raw = take_value(flag, iter)?;
                opts.mode = Some(raw.parse().map_err(Error::InvalidArgs)?);
            }
            "--interval" => {
                let raw = take_value(flag, iter)?;
                opts.interval = Some(humantime::parse_duration(&raw).map_err(|e| {
                    Error::InvalidArgs(format!("interval must be a duration like 5s: {e}"))
                })?);
            }
            "--image" => {
                opts.image = Some(PathBuf::from(take_value(flag, iter)?));
            }
            "--once" => opts.once = true,
            "--log-level" => {
                let raw = take_value(flag, iter)?;
                opts.log_level = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs(format!(
                        "unknown log level '{raw}' (expected error, warn, info, debug or trace)"
                    ))
                })?);
            }
            "--snapshot" => snapshot = true,
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok((opts, snapshot))
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
