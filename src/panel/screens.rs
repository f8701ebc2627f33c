//! Static screens: wrapped text, a scaled image and the calibration card.

use std::path::Path;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline};
use image::imageops::FilterType;

use super::{
    draw_aligned, draw_text, glyph_advance, PanelFrame, BACKGROUND, BODY_FONT, HEADING_FONT,
    HEIGHT, TEXT, WIDTH,
};
use crate::{Error, Result};

pub const SAMPLE_TEXT: &str = "In the beginning was the Word, and the Word was with God, \
and the Word was God. The same was in the beginning with God. All things were made by him; \
and without him was not any thing made that was made.";

const TEXT_MARGIN: i32 = 4;
const TEXT_LINE_HEIGHT: i32 = 13;

pub const ERROR_BACKGROUND: Rgb888 = Rgb888::new(40, 0, 0);
pub const GRID_COLOR: Rgb888 = Rgb888::new(40, 40, 40);
const GRID_STEP: usize = 16;

/// Greedy word wrap: a word goes on the current line if the line still fits
/// `max_width` pixels, otherwise it starts a new one. Over-long words get a
/// line of their own.
pub fn wrap_text(text: &str, font: &MonoFont<'_>, max_width: u32) -> Vec<String> {
    let advance = glyph_advance(font).max(1);
    let max_chars = (max_width / advance).max(1) as usize;

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// White wrapped text on black. Lines that would cross the bottom margin are
/// dropped.
pub fn render_text(text: &str) -> PanelFrame {
    let mut frame = PanelFrame::new(BACKGROUND);
    let max_width = WIDTH - 2 * TEXT_MARGIN as u32;
    let mut y = TEXT_MARGIN;
    for line in wrap_text(text, BODY_FONT, max_width) {
        if y + TEXT_LINE_HEIGHT > HEIGHT as i32 - TEXT_MARGIN {
            break;
        }
        draw_text(&mut frame, &line, TEXT_MARGIN, y, BODY_FONT, TEXT);
        y += TEXT_LINE_HEIGHT;
    }
    frame
}

/// Decode `path` and scale it to the panel, ignoring aspect ratio.
/// `swap_rb` exchanges the red and blue channels of the image only.
pub fn load_image(path: &Path, swap_rb: bool) -> Result<PanelFrame> {
    let decoded = image::open(path)
        .map_err(|e| Error::Parse(format!("cannot decode {}: {e}", path.display())))?;
    let scaled = decoded
        .resize_exact(WIDTH, HEIGHT, FilterType::Lanczos3)
        .to_rgb8();

    let mut frame = PanelFrame::new(BACKGROUND);
    for (x, y, px) in scaled.enumerate_pixels() {
        let [r, g, b] = px.0;
        let (r, b) = if swap_rb { (b, r) } else { (r, b) };
        let _ = Pixel(Point::new(x as i32, y as i32), Rgb888::new(r, g, b)).draw(&mut frame);
    }
    Ok(frame)
}

/// The image at `path`, or a dark red screen saying what went wrong.
pub fn render_image(path: &Path, swap_rb: bool) -> PanelFrame {
    let name = path.display().to_string();
    if !path.exists() {
        return render_message(&format!("{name}\nnot found"));
    }
    load_image(path, swap_rb).unwrap_or_else(|_| render_message(&format!("Error loading\n{name}")))
}

pub fn render_message(message: &str) -> PanelFrame {
    let mut frame = PanelFrame::new(ERROR_BACKGROUND);
    draw_text(&mut frame, message, 10, HEIGHT as i32 / 2 - 10, BODY_FONT, TEXT);
    frame
}

/// Red, green and blue full-screen fills, shown in that order.
pub fn color_fills() -> [PanelFrame; 3] {
    [
        PanelFrame::new(Rgb888::RED),
        PanelFrame::new(Rgb888::GREEN),
        PanelFrame::new(Rgb888::BLUE),
    ]
}

/// Borders, grid, centre cross and corner labels for checking orientation
/// and offsets.
pub fn calibration_card() -> PanelFrame {
    let mut frame = PanelFrame::new(BACKGROUND);
    let w = WIDTH as i32;
    let h = HEIGHT as i32;

    for x in (0..w).step_by(GRID_STEP) {
        stroke_line(&mut frame, Point::new(x, 0), Point::new(x, h - 1), GRID_COLOR);
    }
    for y in (0..h).step_by(GRID_STEP) {
        stroke_line(&mut frame, Point::new(0, y), Point::new(w - 1, y), GRID_COLOR);
    }

    stroke_rect(&mut frame, Point::zero(), Size::new(WIDTH, HEIGHT), Rgb888::MAGENTA);
    stroke_rect(
        &mut frame,
        Point::new(2, 2),
        Size::new(WIDTH - 4, HEIGHT - 4),
        Rgb888::CYAN,
    );

    let (cx, cy) = (w / 2, h / 2);
    stroke_line(&mut frame, Point::new(cx - 10, cy), Point::new(cx + 10, cy), Rgb888::YELLOW);
    stroke_line(&mut frame, Point::new(cx, cy - 10), Point::new(cx, cy + 10), Rgb888::YELLOW);

    let corners = [
        ("0,0", Point::new(4, 4), Alignment::Left, Baseline::Top),
        ("top-right", Point::new(w - 4, 4), Alignment::Right, Baseline::Top),
        ("bot-left", Point::new(4, h - 4), Alignment::Left, Baseline::Bottom),
        ("bot-right", Point::new(w - 4, h - 4), Alignment::Right, Baseline::Bottom),
    ];
    for (label, anchor, alignment, baseline) in corners {
        draw_aligned(&mut frame, label, anchor, BODY_FONT, TEXT, alignment, baseline);
    }
    draw_aligned(
        &mut frame,
        "CENTER",
        Point::new(cx, cy + 14),
        HEADING_FONT,
        Rgb888::GREEN,
        Alignment::Center,
        Baseline::Top,
    );
    frame
}

fn stroke_line(frame: &mut PanelFrame, start: Point, end: Point, color: Rgb888) {
    let _ = Line::new(start, end)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(frame);
}

fn stroke_rect(frame: &mut PanelFrame, top_left: Point, size: Size, color: Rgb888) {
    let _ = Rectangle::new(top_left, size)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(frame);
}
