use std::convert::Infallible;
use std::fmt;

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565, Rgb888};
use embedded_graphics::prelude::*;

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 160;

/// One full screen of 24-bit pixels, row-major from the top-left corner.
#[derive(Clone, PartialEq, Eq)]
pub struct PanelFrame {
    pixels: Vec<Rgb888>,
}

impl PanelFrame {
    pub fn new(background: Rgb888) -> Self {
        Self {
            pixels: vec![background; (WIDTH * HEIGHT) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        self.pixels.get((y * WIDTH + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    pub fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Pixels narrowed to the 16-bit words the controller expects.
    pub fn rgb565_words(&self) -> impl Iterator<Item = u16> + '_ {
        self.pixels
            .iter()
            .map(|&p| Rgb565::from(p).into_storage())
    }
}

impl fmt::Debug for PanelFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanelFrame({WIDTH}x{HEIGHT})")
    }
}

impl OriginDimensions for PanelFrame {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for PanelFrame {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < WIDTH && y < HEIGHT {
                self.pixels[(y * WIDTH + x) as usize] = color;
            }
        }
        Ok(())
    }
}
