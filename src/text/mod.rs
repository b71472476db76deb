//! Text drawing for ad captions and burned-in overlays.
//!
//! Glyphs are rasterized with `ab_glyph` and composited by `imageproc`. Captions are
//! white with a 1 px black outline.
pub mod font;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Frame;

pub use font::{CandidateFontResolver, FontChoice, FontResolver, load_font};

/// Gap between a caption block and the image edge, in pixels.
pub const EDGE_OFFSET: i32 = 5;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Vertical placement of a caption block.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Top,
    Middle,
    Bottom,
}

impl TextPosition {
    pub const ALL: [TextPosition; 3] = [TextPosition::Top, TextPosition::Middle, TextPosition::Bottom];

    pub fn name(&self) -> &'static str {
        match self {
            TextPosition::Top => "top",
            TextPosition::Middle => "middle",
            TextPosition::Bottom => "bottom",
        }
    }
}

/// Named colors offered by the overlay editor, plus `#rgb`, `#rrggbb` and `#rrggbbaa`.
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let named = match value.trim().to_ascii_lowercase().as_str() {
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "red" => Some(Rgba([255, 0, 0, 255])),
        "green" => Some(Rgba([0, 128, 0, 255])),
        "blue" => Some(Rgba([0, 0, 255, 255])),
        "yellow" => Some(Rgba([255, 255, 0, 255])),
        "orange" => Some(Rgba([255, 165, 0, 255])),
        "gray" | "grey" => Some(Rgba([128, 128, 128, 255])),
        _ => None,
    };
    if let Some(color) = named {
        return Ok(color);
    }

    let invalid = || Error::InvalidColor(value.to_string());
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                rgb[i] = channel(&c.to_string())? * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let alpha = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
            Ok(Rgba([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                alpha,
            ]))
        }
        _ => Err(invalid()),
    }
}

/// First eight ASCII alphanumerics of `text`, lowercased, for file names.
pub fn text_slug(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Greedy word wrap against `max_width` as reported by `measure`.
/// A single word wider than the limit gets a line of its own.
pub fn wrap_words(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let mut candidate = current.clone();
        candidate.push(word);
        if measure(&candidate.join(" ")) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(current.join(" "));
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Top edge of a `block_height` caption inside an `image_height` image.
pub fn block_top(position: TextPosition, image_height: u32, block_height: u32, offset: i32) -> i32 {
    let spare = image_height as i64 - block_height as i64;
    let top = match position {
        TextPosition::Top => offset as i64,
        TextPosition::Middle => spare.div_euclid(2),
        TextPosition::Bottom => spare - offset as i64,
    };
    clamp_i32(top)
}

pub(crate) fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// One loaded font and the drawing operations built on it.
pub struct TextPainter {
    font: FontVec,
}

impl TextPainter {
    pub fn new(font: FontVec) -> Self {
        Self { font }
    }

    pub fn from_choice(choice: &FontChoice, family: &str) -> Result<Self> {
        Ok(Self::new(choice.load(family)?))
    }

    /// Pixel extent of `text` at `size` px.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    pub fn line_height(&self, size: f32) -> u32 {
        self.measure("Ay", size).1
    }

    /// Draws `text` with its top-left corner at `(x, y)`, outline first.
    pub fn draw_outlined(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        (x, y): (i32, i32),
        size: f32,
        fill: Rgba<u8>,
        outline: Option<(Rgba<u8>, u32)>,
    ) {
        let scale = PxScale::from(size);
        if let Some((color, width)) = outline {
            let w = width.min(i32::MAX as u32) as i32;
            for dx in -w..=w {
                for dy in -w..=w {
                    if dx != 0 || dy != 0 {
                        draw_text_mut(canvas, color, x + dx, y + dy, scale, &self.font, text);
                    }
                }
            }
        }
        draw_text_mut(canvas, fill, x, y, scale, &self.font, text);
    }

    /// Same as `draw_outlined`, with `(cx, cy)` as the middle of the text.
    pub fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        (cx, cy): (i32, i32),
        size: f32,
        fill: Rgba<u8>,
        outline: Option<(Rgba<u8>, u32)>,
    ) {
        let (w, h) = self.measure(text, size);
        let x = cx.saturating_sub((w / 2) as i32);
        let y = cy.saturating_sub((h / 2) as i32);
        self.draw_outlined(canvas, text, (x, y), size, fill, outline);
    }

    /// Wrapped, horizontally centered caption with a 1 px black outline.
    pub fn draw_caption(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        position: TextPosition,
        font_size: u32,
    ) {
        let size = font_size as f32;
        let (width, height) = canvas.dimensions();
        let max_width = (width as i64 - 2 * EDGE_OFFSET as i64).max(0) as u32;
        let lines = wrap_words(text, max_width, |line| self.measure(line, size).0);
        let line_height = self.line_height(size);
        let top = block_top(position, height, line_height * lines.len() as u32, EDGE_OFFSET);

        for (i, line) in lines.iter().enumerate() {
            let line_width = self.measure(line, size).0;
            let x = clamp_i32((width as i64 - line_width as i64).div_euclid(2));
            let y = clamp_i32(top as i64 + i as i64 * line_height as i64);
            self.draw_outlined(canvas, line, (x, y), size, WHITE, Some((BLACK, 1)));
        }
    }

    /// A copy of `frame` with the caption drawn on it.
    pub fn caption(
        &self,
        frame: &Frame,
        text: &str,
        position: TextPosition,
        font_size: u32,
    ) -> Result<Frame> {
        let mut canvas = frame.clone().into_rgba_image()?;
        self.draw_caption(&mut canvas, text, position, font_size);
        Frame::from_rgba_image(canvas)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::TargetRect;

    /// A painter backed by whatever system font is installed, if any.
    pub(crate) fn system_painter() -> Option<TextPainter> {
        let choice = CandidateFontResolver::system_default().resolve("test");
        TextPainter::from_choice(&choice, "test").ok()
    }

    fn gray_frame(width: u32, height: u32) -> Frame {
        let pixels = [100u8, 100, 100, 255]
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Frame::new(TargetRect::new(width as i64, height as i64).unwrap(), pixels)
    }

    #[test]
    fn wraps_on_measured_width() {
        let by_chars = |s: &str| s.chars().count() as u32 * 10;
        assert_eq!(
            wrap_words("Best Prices Guaranteed!", 120, by_chars),
            vec!["Best Prices", "Guaranteed!"]
        );
        assert_eq!(
            wrap_words("Supercalifragilistic now", 120, by_chars),
            vec!["Supercalifragilistic", "now"]
        );
        assert_eq!(wrap_words("Buy Now!", 500, by_chars), vec!["Buy Now!"]);
        assert!(wrap_words("   ", 500, by_chars).is_empty());
    }

    #[test]
    fn block_positions() {
        assert_eq!(block_top(TextPosition::Top, 250, 40, 5), 5);
        assert_eq!(block_top(TextPosition::Middle, 250, 40, 5), 105);
        assert_eq!(block_top(TextPosition::Bottom, 250, 40, 5), 205);
        // taller than the image: floor division, like the templates
        assert_eq!(block_top(TextPosition::Middle, 20, 31, 5), -6);
    }

    #[test]
    fn slugs_for_file_names() {
        assert_eq!(text_slug("Buy Now!"), "buynow");
        assert_eq!(text_slug("Limited Time Offer!"), "limitedt");
        assert_eq!(text_slug("Best Prices Guaranteed!"), "bestpric");
    }

    #[test]
    fn colors_by_name_and_hex() {
        assert_eq!(parse_color("White").unwrap(), WHITE);
        assert_eq!(parse_color("yellow").unwrap(), Rgba([255, 255, 0, 255]));
        assert_eq!(parse_color("#ff8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_color("#f80").unwrap(), Rgba([255, 136, 0, 255]));
        assert_eq!(parse_color("#00000080").unwrap(), Rgba([0, 0, 0, 128]));
        assert!(matches!(parse_color("chartreuse"), Err(Error::InvalidColor(_))));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gg0000").is_err());
    }

    #[test]
    fn caption_draws_only_in_its_band() {
        let Some(painter) = system_painter() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        let frame = gray_frame(300, 250);
        let captioned = painter
            .caption(&frame, "Buy Now!", TextPosition::Top, 20)
            .unwrap();
        assert_eq!(captioned.dimensions(), (300, 250));

        let band = (EDGE_OFFSET as u32 + painter.line_height(20.0) + 2).min(250);
        let mut bright = false;
        let mut dark = false;
        for y in 0..band {
            for x in 0..300 {
                let [r, g, b, _] = captioned.pixel(x, y).unwrap();
                bright |= r > 200 && g > 200 && b > 200;
                dark |= r < 60 && g < 60 && b < 60;
            }
        }
        assert!(bright, "no fill pixels in the top band");
        assert!(dark, "no outline pixels in the top band");

        for y in 125..250 {
            for x in 0..300 {
                assert_eq!(captioned.pixel(x, y), frame.pixel(x, y));
            }
        }
    }

    #[test]
    fn centered_text_straddles_the_anchor() {
        let Some(painter) = system_painter() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        let mut canvas = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        painter.draw_centered(&mut canvas, "HH", (100, 50), 30.0, WHITE, None);

        let lit: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().any(|&(x, _)| x < 100));
        assert!(lit.iter().any(|&(x, _)| x > 100));
        assert!(lit.iter().all(|&(_, y)| (20..80).contains(&y)));
    }
}
