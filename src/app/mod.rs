use crate::{
    cli::RunOptions,
    command::SystemRunner,
    config::{validate, Config, Mode},
    display::{PanelWiring, St7735Panel},
    metrics::SystemReader,
    panel::StatusSnapshot,
    wifi::{InterfacePolicy, SignalEstimator},
    Result,
};
use std::{path::PathBuf, time::Duration};

mod lifecycle;
pub mod logger;
pub mod render_loop;

use lifecycle::create_shutdown_flag;
pub use lifecycle::{render_shutdown, sleep_while_running};
pub use logger::{LogLevel, Logger};
use render_loop::{run_mode, StatusSources};

/// Config for the daemon: the file settings with CLI overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub mode: Mode,
    pub refresh_interval: Duration,
    pub command_timeout: Duration,
    pub smoothing_factor: f64,
    pub interface_policy: InterfacePolicy,
    pub wiring: PanelWiring,
    pub image_file: PathBuf,
    pub image_swap_rb: bool,
    pub text: String,
    pub once: bool,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AppConfig {
    fn from_config(cfg: &Config) -> Self {
        Self {
            mode: cfg.mode,
            refresh_interval: cfg.refresh_interval,
            command_timeout: cfg.command_timeout(),
            smoothing_factor: cfg.smoothing_factor,
            interface_policy: cfg.interface_policy,
            wiring: cfg.wiring(),
            image_file: cfg.image_file.clone(),
            image_swap_rb: cfg.image_swap_rb,
            text: cfg.text.clone(),
            once: false,
            log_level: LogLevel::default(),
        }
    }

    /// CLI values win over the config file.
    pub fn from_sources(mut cfg: Config, opts: RunOptions) -> Result<Self> {
        if let Some(mode) = opts.mode {
            cfg.mode = mode;
        }
        if let Some(interval) = opts.interval {
            cfg.refresh_interval = interval;
        }
        if let Some(image) = opts.image {
            cfg.image_file = image;
        }
        validate(&cfg)?;

        let mut merged = Self::from_config(&cfg);
        merged.once = opts.once;
        if let Some(level) = opts.log_level {
            merged.log_level = level;
        }
        Ok(merged)
    }
}

pub struct App {
    config: AppConfig,
    logger: Logger,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let logger = Logger::new(config.log_level);
        Self { config, logger }
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = Config::load_or_default()?;
        let merged = AppConfig::from_sources(cfg_file, opts)?;
        let app = Self::new(merged);
        if std::env::var_os("HOME").map_or(true, |home| home.is_empty()) {
            app.logger
                .debug("HOME not set; using built-in defaults without a config file");
        }
        Ok(app)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// One reading of every status value, without touching the display.
    pub fn snapshot(&self) -> Result<StatusSnapshot> {
        let mut sources = self.sources()?;
        Ok(sources.sample(chrono::Local::now().naive_local()))
    }

    /// Entry point for the daemon. Only display bring-up errors are fatal.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        let mut panel = St7735Panel::new(config.wiring)?;
        self.logger.info(format!(
            "panel start (mode={}, interval={}, policy={}, spi={} Hz)",
            config.mode,
            humantime::format_duration(config.refresh_interval),
            config.interface_policy,
            config.wiring.spi_speed_hz
        ));

        let running = create_shutdown_flag()?;
        let mut sources = self.sources()?;
        run_mode(
            &mut panel,
            &mut sources,
            config,
            &self.logger,
            &running,
            || chrono::Local::now().naive_local(),
        )
    }

    fn sources(&self) -> Result<StatusSources<SystemRunner, SystemRunner>> {
        let runner = SystemRunner::new(self.config.command_timeout);
        let estimator = SignalEstimator::new(
            runner,
            self.config.smoothing_factor,
            self.config.interface_policy,
        )?;
        Ok(StatusSources::new(SystemReader::new(runner), estimator))
    }
}
