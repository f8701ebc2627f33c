//! Frame sinks: the ST7735 panel and an in-memory recorder.

use crate::panel::PanelFrame;
use crate::Result;

pub mod st7735;

pub use st7735::St7735Panel;

pub const DEFAULT_SPI_SPEED_HZ: u32 = 24_000_000;
pub const DEFAULT_DC_PIN: u8 = 6;
pub const DEFAULT_RST_PIN: u8 = 12;
pub const DEFAULT_CS_PIN: u8 = 5;

/// Wiring and controller options for the SPI panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelWiring {
    pub spi_speed_hz: u32,
    pub dc_pin: u8,
    pub rst_pin: u8,
    /// Chip-select GPIO, driven low for the lifetime of the panel.
    pub cs_pin: u8,
    /// Send blue-green-red instead of red-green-blue.
    pub bgr: bool,
}

impl Default for PanelWiring {
    fn default() -> Self {
        Self {
            spi_speed_hz: DEFAULT_SPI_SPEED_HZ,
            dc_pin: DEFAULT_DC_PIN,
            rst_pin: DEFAULT_RST_PIN,
            cs_pin: DEFAULT_CS_PIN,
            bgr: false,
        }
    }
}

/// Anything that can show a full frame.
pub trait PanelSink {
    fn show(&mut self, frame: &PanelFrame) -> Result<()>;
}

impl<S: PanelSink + ?Sized> PanelSink for Box<S> {
    fn show(&mut self, frame: &PanelFrame) -> Result<()> {
        (**self).show(frame)
    }
}

/// Keeps every frame it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Vec<PanelFrame>,
    fail_next: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `show` fail without recording.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    pub fn frames(&self) -> &[PanelFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&PanelFrame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PanelSink for RecordingSink {
    fn show(&mut self, frame: &PanelFrame) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(crate::Error::Display("simulated transfer failure".into()));
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}
