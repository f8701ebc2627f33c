use crate::command::DEFAULT_COMMAND_TIMEOUT_MS;
use crate::display::{
    PanelWiring, DEFAULT_CS_PIN, DEFAULT_DC_PIN, DEFAULT_RST_PIN, DEFAULT_SPI_SPEED_HZ,
};
use crate::panel::screens::SAMPLE_TEXT;
use crate::wifi::{InterfacePolicy, DEFAULT_SMOOTHING_FACTOR};
use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod loader;

pub const DEFAULT_MODE: Mode = Mode::System;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_IMAGE_FILE: &str = "display_image.png";
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);
pub const MIN_COMMAND_TIMEOUT_MS: u64 = 50;
pub const MAX_COMMAND_TIMEOUT_MS: u64 = 5_000;
const CONFIG_DIR_NAME: &str = ".status_panel";
const CONFIG_FILE_NAME: &str = "config.toml";

/// What the panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Host status, refreshed every interval.
    #[default]
    System,
    /// Word-wrapped text, painted once.
    Text,
    /// A scaled image file, painted once.
    Image,
    /// Colour fills followed by a calibration card.
    Test,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(Mode::System),
            "text" => Ok(Mode::Text),
            "image" => Ok(Mode::Image),
            "test" => Ok(Mode::Test),
            other => Err(format!(
                "unknown mode '{other}' (expected system, text, image or test)"
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::System => "system",
            Mode::Text => "text",
            Mode::Image => "image",
            Mode::Test => "test",
        };
        f.write_str(name)
    }
}

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub refresh_interval: Duration,
    pub command_timeout_ms: u64,
    pub smoothing_factor: f64,
    pub interface_policy: InterfacePolicy,
    pub spi_speed_hz: u32,
    pub dc_pin: u8,
    pub rst_pin: u8,
    pub cs_pin: u8,
    pub bgr: bool,
    pub image_file: PathBuf,
    /// Swap red and blue in image mode only; text and status screens are unaffected.
    pub image_swap_rb: bool,
    pub text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            interface_policy: InterfacePolicy::default(),
            spi_speed_hz: DEFAULT_SPI_SPEED_HZ,
            dc_pin: DEFAULT_DC_PIN,
            rst_pin: DEFAULT_RST_PIN,
            cs_pin: DEFAULT_CS_PIN,
            bgr: false,
            image_file: PathBuf::from(DEFAULT_IMAGE_FILE),
            image_swap_rb: false,
            text: SAMPLE_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Load `~/.status_panel/config.toml`, or defaults when it is absent.
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn wiring(&self) -> PanelWiring {
        PanelWiring {
            spi_speed_hz: self.spi_speed_hz,
            dc_pin: self.dc_pin,
            rst_pin: self.rst_pin,
            cs_pin: self.cs_pin,
            bgr: self.bgr,
        }
    }
}

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    if !(cfg.smoothing_factor > 0.0 && cfg.smoothing_factor <= 1.0) {
        return Err(Error::InvalidArgs(format!(
            "smoothing_factor must be in (0, 1], got {}",
            cfg.smoothing_factor
        )));
    }
    if !(MIN_COMMAND_TIMEOUT_MS..=MAX_COMMAND_TIMEOUT_MS).contains(&cfg.command_timeout_ms) {
        return Err(Error::InvalidArgs(format!(
            "command_timeout_ms must be between {MIN_COMMAND_TIMEOUT_MS} and {MAX_COMMAND_TIMEOUT_MS}"
        )));
    }
    if cfg.refresh_interval < MIN_REFRESH_INTERVAL {
        return Err(Error::InvalidArgs(
            "refresh_interval must be at least 1s".to_string(),
        ));
    }
    if cfg.spi_speed_hz == 0 {
        return Err(Error::InvalidArgs("spi_speed_hz must be non-zero".into()));
    }
    let pins = [cfg.dc_pin, cfg.rst_pin, cfg.cs_pin];
    if pins[0] == pins[1] || pins[0] == pins[2] || pins[1] == pins[2] {
        return Err(Error::InvalidArgs(
            "dc_pin, rst_pin and cs_pin must be distinct".into(),
        ));
    }
    Ok(())
}
