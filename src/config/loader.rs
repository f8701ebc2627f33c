use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

use super::{Config, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Load from the home directory. A missing file, or no `HOME` at all (system
/// services), means defaults; the file is never created.
pub fn load_or_default() -> Result<Config> {
    let home = std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from);
    load_from_optional_home(home.as_deref())
}

pub fn load_from_optional_home(home: Option<&Path>) -> Result<Config> {
    match home {
        Some(home) => load_from_home(home),
        None => defaults(),
    }
}

pub fn load_from_home(home: &Path) -> Result<Config> {
    load_from_path(&config_path(home))
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        return defaults();
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg = Config::default();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            Error::InvalidArgs(format!("invalid config line {}: '{}'", idx + 1, line))
        })?;

        let key = key.trim();
        let value = value.trim().trim_matches('"');
        let line_no = idx + 1;
        match key {
            "mode" => {
                cfg.mode = value.parse().map_err(|e: String| {
                    Error::InvalidArgs(format!("invalid mode on line {line_no}: {e}"))
                })?;
            }
            "refresh_interval" => {
                cfg.refresh_interval = humantime::parse_duration(value).map_err(|e| {
                    Error::InvalidArgs(format!("invalid refresh_interval on line {line_no}: {e}"))
                })?;
            }
            "command_timeout_ms" => {
                cfg.command_timeout_ms = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid command_timeout_ms on line {line_no}"))
                })?;
            }
            "smoothing_factor" => {
                cfg.smoothing_factor = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid smoothing_factor on line {line_no}"))
                })?;
            }
            "interface_policy" => {
                cfg.interface_policy = value.parse().map_err(|e| {
                    Error::InvalidArgs(format!("invalid interface_policy on line {line_no}: {e}"))
                })?;
            }
            "spi_speed_hz" => {
                cfg.spi_speed_hz = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid spi_speed_hz on line {line_no}"))
                })?;
            }
            "dc_pin" => cfg.dc_pin = parse_pin(value, "dc_pin", line_no)?,
            "rst_pin" => cfg.rst_pin = parse_pin(value, "rst_pin", line_no)?,
            "cs_pin" => cfg.cs_pin = parse_pin(value, "cs_pin", line_no)?,
            "bgr" => {
                cfg.bgr = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!("invalid bgr on line {line_no}: expected true or false"))
                })?;
            }
            "image_file" => cfg.image_file = PathBuf::from(value),
            "image_swap_rb" => {
                cfg.image_swap_rb = value.parse().map_err(|_| {
                    Error::InvalidArgs(format!(
                        "invalid image_swap_rb on line {line_no}: expected true or false"
                    ))
                })?;
            }
            "text" => cfg.text = value.to_string(),
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown config key '{}' on line {}",
                    other, line_no
                )));
            }
        }
    }

    super::validate(&cfg)?;
    Ok(cfg)
}

fn parse_pin(value: &str, key: &str, line_no: usize) -> Result<u8> {
    let pin: u8 = value
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("invalid {key} on line {line_no}")))?;
    if pin > 27 {
        return Err(Error::InvalidArgs(format!(
            "{key} on line {line_no} must be a BCM GPIO number (0-27)"
        )));
    }
    Ok(pin)
}

fn defaults() -> Result<Config> {
    let cfg = Config::default();
    super::validate(&cfg)?;
    Ok(cfg)
}

fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}
