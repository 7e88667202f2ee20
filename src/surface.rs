//! Seams between the label engine and whatever draws the page.
//!
//! Coordinates are page points with the origin at the top-left corner and y
//! growing downward. Surfaces with another convention convert on their side.

/// Which of the sheet's two faces a text run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single line of text. `x` is the left edge and `baseline` the baseline,
/// both already resolved by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub content: &'a str,
    pub x: f64,
    pub baseline: f64,
    pub font: FontRole,
    pub size: f64,
}

/// 8-bit grayscale pixels, row-major from the top row. 0 is black.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayRaster<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

pub trait DrawSurface {
    /// Filled rectangles are opaque black; unfilled ones are a hairline outline.
    fn draw_rect(&mut self, rect: Rect, filled: bool);

    fn draw_text(&mut self, run: TextRun<'_>);

    /// Scale `raster` to fill `rect`.
    fn draw_image(&mut self, raster: GrayRaster<'_>, rect: Rect);
}

/// Width of rendered text. Must give the same answer for the same inputs
/// for the lifetime of a render.
pub trait FontMetrics {
    fn measure(&self, text: &str, font: FontRole, size: f64) -> f64;
}
