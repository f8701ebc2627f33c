use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveDateTime;

use super::lifecycle::{render_shutdown, sleep_while_running};
use super::{AppConfig, Logger};
use crate::command::CommandRunner;
use crate::config::Mode;
use crate::display::PanelSink;
use crate::metrics::SystemReader;
use crate::panel::screens::{calibration_card, color_fills, render_image, render_text};
use crate::panel::{render_status, PanelFrame, StatusSnapshot};
use crate::wifi::SignalEstimator;
use crate::Result;

const FILL_HOLD: Duration = Duration::from_secs(1);
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Readers polled by the status screen. Built once and kept for the life of
/// the loop so the Wi-Fi smoothing state carries over between cycles.
pub struct StatusSources<R: CommandRunner, W: CommandRunner> {
    pub reader: SystemReader<R>,
    pub estimator: SignalEstimator<W>,
}

impl<R: CommandRunner, W: CommandRunner> StatusSources<R, W> {
    pub fn new(reader: SystemReader<R>, estimator: SignalEstimator<W>) -> Self {
        Self { reader, estimator }
    }

    pub fn sample(&mut self, now: NaiveDateTime) -> StatusSnapshot {
        StatusSnapshot::collect(&self.reader, &mut self.estimator, now)
    }
}

/// Drive the configured mode until `running` clears (or after one pass with
/// `once`). Transfer failures are logged and retried on the next frame.
pub fn run_mode<S, R, W, C>(
    sink: &mut S,
    sources: &mut StatusSources<R, W>,
    config: &AppConfig,
    logger: &Logger,
    running: &AtomicBool,
    mut clock: C,
) -> Result<()>
where
    S: PanelSink + ?Sized,
    R: CommandRunner,
    W: CommandRunner,
    C: FnMut() -> NaiveDateTime,
{
    match config.mode {
        Mode::System => {
            let cycles = run_status_loop(sink, sources, config, logger, running, &mut clock);
            logger.debug(format!("status loop finished after {cycles} cycles"));
        }
        Mode::Text => {
            show(sink, &render_text(&config.text), logger);
            idle(config, running);
        }
        Mode::Image => {
            if !config.image_file.exists() {
                logger.warn(format!("image {} not found", config.image_file.display()));
            }
            show(
                sink,
                &render_image(&config.image_file, config.image_swap_rb),
                logger,
            );
            idle(config, running);
        }
        Mode::Test => {
            for fill in color_fills() {
                show(sink, &fill, logger);
                if !sleep_while_running(FILL_HOLD, running) {
                    break;
                }
            }
            if running.load(Ordering::SeqCst) {
                show(sink, &calibration_card(), logger);
                idle(config, running);
            }
        }
    }

    if !running.load(Ordering::SeqCst) {
        logger.info("shutting down");
        if let Err(err) = render_shutdown(sink) {
            logger.warn(format!("could not paint shutdown screen: {err}"));
        }
    }
    Ok(())
}

/// Render, transfer, sleep; returns the number of frames rendered.
pub fn run_status_loop<S, R, W, C>(
    sink: &mut S,
    sources: &mut StatusSources<R, W>,
    config: &AppConfig,
    logger: &Logger,
    running: &AtomicBool,
    clock: &mut C,
) -> usize
where
    S: PanelSink + ?Sized,
    R: CommandRunner,
    W: CommandRunner,
    C: FnMut() -> NaiveDateTime,
{
    let mut cycles = 0;
    while running.load(Ordering::SeqCst) {
        let snapshot = sources.sample(clock());
        logger.debug(format!("wifi: {}", snapshot.wifi));
        show(sink, &render_status(&snapshot), logger);
        cycles += 1;

        if config.once || !sleep_while_running(config.refresh_interval, running) {
            break;
        }
    }
    cycles
}

fn show<S: PanelSink + ?Sized>(sink: &mut S, frame: &PanelFrame, logger: &Logger) {
    if let Err(err) = sink.show(frame) {
        logger.warn(format!("display transfer failed: {err}"));
    }
}

fn idle(config: &AppConfig, running: &AtomicBool) {
    if config.once {
        return;
    }
    while sleep_while_running(IDLE_TICK, running) {}
}
