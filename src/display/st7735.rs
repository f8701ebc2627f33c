use super::{PanelSink, PanelWiring};
use crate::panel::{PanelFrame, HEIGHT, WIDTH};
use crate::{Error, Result};

#[cfg(target_os = "linux")]
use rppal::{
    gpio::{Gpio, OutputPin},
    hal::Delay,
    spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi},
};
#[cfg(target_os = "linux")]
use st7735_lcd::{Orientation, ST7735};

#[cfg(target_os = "linux")]
fn map_gpio_err(err: rppal::gpio::Error) -> Error {
    Error::Io(std::io::Error::other(err))
}

#[cfg(target_os = "linux")]
fn map_spi_err(err: rppal::spi::Error) -> Error {
    Error::Io(std::io::Error::other(err))
}

/// ST7735R controller on SPI0. Linux drives real hardware; other platforms
/// get a stub that accepts and discards frames.
pub struct St7735Panel {
    wiring: PanelWiring,
    #[cfg(target_os = "linux")]
    driver: ST7735<SimpleHalSpiDevice, OutputPin, OutputPin>,
    #[cfg(target_os = "linux")]
    _cs: OutputPin,
}

impl St7735Panel {
    pub fn new(wiring: PanelWiring) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let gpio = Gpio::new().map_err(map_gpio_err)?;
            let cs = gpio
                .get(wiring.cs_pin)
                .map_err(map_gpio_err)?
                .into_output_low();
            let dc = gpio
                .get(wiring.dc_pin)
                .map_err(map_gpio_err)?
                .into_output();
            let rst = gpio
                .get(wiring.rst_pin)
                .map_err(map_gpio_err)?
                .into_output();
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, wiring.spi_speed_hz, Mode::Mode0)
                .map_err(map_spi_err)?;

            let mut driver = ST7735::new(
                SimpleHalSpiDevice::new(spi),
                dc,
                rst,
                !wiring.bgr,
                false,
                WIDTH,
                HEIGHT,
            );
            let mut delay = Delay::new();
            driver
                .init(&mut delay)
                .map_err(|_| Error::Display("ST7735 init failed".into()))?;
            driver
                .set_orientation(&Orientation::Portrait)
                .map_err(|_| Error::Display("ST7735 orientation failed".into()))?;
            return Ok(Self {
                wiring,
                driver,
                _cs: cs,
            });
        }

        #[cfg(not(target_os = "linux"))]
        {
            Ok(Self { wiring })
        }
    }

    pub fn wiring(&self) -> &PanelWiring {
        &self.wiring
    }
}

impl PanelSink for St7735Panel {
    fn show(&mut self, frame: &PanelFrame) -> Result<()> {
        #[cfg(target_os = "linux")]
        {
            return self
                .driver
                .set_pixels(
                    0,
                    0,
                    (WIDTH - 1) as u16,
                    (HEIGHT - 1) as u16,
                    frame.rgb565_words(),
                )
                .map_err(|_| Error::Display("ST7735 frame transfer failed".into()));
        }
        #[cfg(not(target_os = "linux"))]
        {
            let _ = frame;
            Ok(())
        }
    }
}
