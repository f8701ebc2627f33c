//! Software canvas and screen layouts.
//!
//! Everything here draws into a [`PanelFrame`]; nothing touches hardware.

use embedded_graphics::mono_font::{iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

pub mod frame;
pub mod screens;
pub mod status;

pub use frame::{PanelFrame, HEIGHT, WIDTH};
pub use status::{render_status, StatusSnapshot};

pub const BODY_FONT: &MonoFont<'static> = &iso_8859_1::FONT_6X10;
pub const HEADING_FONT: &MonoFont<'static> = &iso_8859_1::FONT_6X13_BOLD;

pub const BACKGROUND: Rgb888 = Rgb888::new(0, 0, 0);
pub const TEXT: Rgb888 = Rgb888::new(255, 255, 255);

/// Draw `text` with its top-left corner at (`x`, `y`).
pub(crate) fn draw_text(
    frame: &mut PanelFrame,
    text: &str,
    x: i32,
    y: i32,
    font: &MonoFont<'_>,
    color: Rgb888,
) {
    let style = MonoTextStyle::new(font, color);
    let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(frame);
}

pub(crate) fn draw_aligned(
    frame: &mut PanelFrame,
    text: &str,
    anchor: Point,
    font: &MonoFont<'_>,
    color: Rgb888,
    alignment: Alignment,
    baseline: Baseline,
) {
    let style = MonoTextStyle::new(font, color);
    let layout = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(baseline)
        .build();
    let _ = Text::with_text_style(text, anchor, style, layout).draw(frame);
}

/// Horizontal advance of one glyph in `font`, in pixels.
pub fn glyph_advance(font: &MonoFont<'_>) -> u32 {
    font.character_size.width + font.character_spacing
}
