use log::warn;

use super::fields::LabelFields;
use crate::barcode::{self, SymbolCode};
use crate::error::LabelError;
use crate::layout::{FitResult, GridCell, TextFitter};
use crate::surface::{DrawSurface, FontMetrics, FontRole, Rect, TextRun};

const TOP_PADDING: f64 = 5.0;
const BOTTOM_PADDING: f64 = 3.0;
const BLOCK_GAP: f64 = 1.5;
const DESCRIPTION_INSET: f64 = 4.0;
const IDENTIFIER_SIZE: f64 = 9.0;
const SKU_SIZE: f64 = 8.0;
const BOTTOM_ROW_SIZE: f64 = 6.0;
/// Baseline offset below the top of a line, as a fraction of the font size.
const ASCENT: f64 = 0.8;
/// Advance between stacked single lines, as a fraction of the font size.
const LINE_HEIGHT: f64 = 1.15;
const ELLIPSIS: &str = "...";

/// Tunable geometry and typography of a label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub barcode_height_ratio: f64,
    pub barcode_width_ratio: f64,
    pub min_module_width: f64,
    pub status_text: String,
    pub draw_border: bool,
    pub description: TextFitter,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            barcode_height_ratio: 0.35,
            barcode_width_ratio: 0.90,
            min_module_width: 0.6,
            status_text: "NEW".to_string(),
            draw_border: false,
            description: TextFitter::new(3.5, 6.0).with_line_gap(1.5),
        }
    }
}

/// What happened while composing one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelReport {
    /// The description did not fit even at the minimum size and was cut.
    pub description_truncated: bool,
}

/// Draws complete labels into grid cells.
pub struct LabelComposer<'a, M: FontMetrics + ?Sized> {
    style: LabelStyle,
    metrics: &'a M,
}

impl<'a, M: FontMetrics + ?Sized> LabelComposer<'a, M> {
    pub fn new(style: LabelStyle, metrics: &'a M) -> Self {
        Self { style, metrics }
    }

    /// Encode the identifier and draw the label. Nothing is drawn when the
    /// identifier cannot be encoded.
    pub fn compose<S: DrawSurface + ?Sized>(
        &self,
        fields: &LabelFields,
        cell: &GridCell,
        surface: &mut S,
    ) -> Result<LabelReport, LabelError> {
        let codes = barcode::encode(&fields.identifier)?;
        Ok(self.compose_encoded(fields, &codes, cell, surface))
    }

    /// Draw the label using symbol codes already encoded from `fields.identifier`.
    pub fn compose_encoded<S: DrawSurface + ?Sized>(
        &self,
        fields: &LabelFields,
        codes: &[SymbolCode],
        cell: &GridCell,
        surface: &mut S,
    ) -> LabelReport {
        let mut cursor = cell.y + TOP_PADDING;

        let (bar_left, bar_right) = self.draw_barcode(fields, codes, cell, cursor, surface);
        cursor += cell.height * self.style.barcode_height_ratio + BLOCK_GAP;

        self.draw_centered(&fields.identifier, FontRole::Bold, IDENTIFIER_SIZE, cell, cursor, surface);
        cursor += IDENTIFIER_SIZE * LINE_HEIGHT;

        self.draw_centered(&fields.sku, FontRole::Bold, SKU_SIZE, cell, cursor, surface);
        cursor += SKU_SIZE * LINE_HEIGHT;

        let bottom_baseline = cell.y + cell.height - BOTTOM_PADDING;
        let bottom_top = bottom_baseline - BOTTOM_ROW_SIZE * ASCENT;

        let description_box = Rect {
            x: cell.x + DESCRIPTION_INSET,
            y: cursor,
            width: (cell.width - 2.0 * DESCRIPTION_INSET).max(0.0),
            height: (bottom_top - BLOCK_GAP - cursor).max(0.0),
        };
        let report = self.draw_description(&fields.description, description_box, surface);

        surface.draw_text(TextRun {
            content: &self.style.status_text,
            x: bar_left,
            baseline: bottom_baseline,
            font: FontRole::Bold,
            size: BOTTOM_ROW_SIZE,
        });
        let country_width = self.measure(&fields.country, FontRole::Bold, BOTTOM_ROW_SIZE);
        surface.draw_text(TextRun {
            content: &fields.country,
            x: bar_right - country_width,
            baseline: bottom_baseline,
            font: FontRole::Bold,
            size: BOTTOM_ROW_SIZE,
        });

        if self.style.draw_border {
            surface.draw_rect(
                Rect {
                    x: cell.x,
                    y: cell.y,
                    width: cell.width,
                    height: cell.height,
                },
                false,
            );
        }

        report
    }

    /// Module width for an identifier of `len` characters in a cell `cell_width` wide.
    pub fn module_width(&self, len: usize, cell_width: f64) -> f64 {
        let target = cell_width * self.style.barcode_width_ratio;
        (target / barcode::estimated_modules(len) as f64).max(self.style.min_module_width)
    }

    /// Returns the horizontal extent of the drawn bars.
    fn draw_barcode<S: DrawSurface + ?Sized>(
        &self,
        fields: &LabelFields,
        codes: &[SymbolCode],
        cell: &GridCell,
        top: f64,
        surface: &mut S,
    ) -> (f64, f64) {
        let module = self.module_width(fields.identifier.chars().count(), cell.width);
        let segments = barcode::sequence(codes, module);
        let span = barcode::span(&segments);
        if span > cell.width {
            warn!(
                "Barcode for {:?} is {:.1}pt wide and overflows its {:.1}pt cell",
                fields.identifier, span, cell.width
            );
        }

        let left = cell.x + (cell.width - span) / 2.0;
        let height = cell.height * self.style.barcode_height_ratio;
        for segment in segments.iter().filter(|s| s.filled) {
            surface.draw_rect(
                Rect {
                    x: left + segment.offset,
                    y: top,
                    width: segment.width,
                    height,
                },
                true,
            );
        }
        (left, left + span)
    }

    fn draw_centered<S: DrawSurface + ?Sized>(
        &self,
        text: &str,
        font: FontRole,
        size: f64,
        cell: &GridCell,
        top: f64,
        surface: &mut S,
    ) {
        let width = self.measure(text, font, size);
        surface.draw_text(TextRun {
            content: text,
            x: cell.x + (cell.width - width) / 2.0,
            baseline: top + size * ASCENT,
            font,
            size,
        });
    }

    fn draw_description<S: DrawSurface + ?Sized>(
        &self,
        text: &str,
        area: Rect,
        surface: &mut S,
    ) -> LabelReport {
        let fitter = &self.style.description;
        let measure = |s: &str, size: f64| self.measure(s, FontRole::Regular, size);
        let fit = fitter.fit(text, area.width, area.height, measure);

        let mut report = LabelReport::default();
        let FitResult { lines, font_size, .. } = if fit.overflow {
            warn!("Description {:?} does not fit its box, truncating", text);
            report.description_truncated = true;
            self.truncate(fit, area)
        } else {
            fit
        };

        let pitch = font_size + fitter.line_gap;
        let block = fitter.block_height(lines.len(), font_size);
        let top = area.y + ((area.height - block) / 2.0).max(0.0);
        for (i, line) in lines.iter().enumerate() {
            let width = self.measure(line, FontRole::Regular, font_size);
            surface.draw_text(TextRun {
                content: line,
                x: area.x + (area.width - width) / 2.0,
                baseline: top + i as f64 * pitch + font_size * ASCENT,
                font: FontRole::Regular,
                size: font_size,
            });
        }
        report
    }

    /// Keep the lines that fit vertically (at least one) and shorten any line
    /// that is still too wide, marking cuts with an ellipsis.
    fn truncate(&self, fit: FitResult, area: Rect) -> FitResult {
        let FitResult { mut lines, font_size, overflow } = fit;
        let pitch = font_size + self.style.description.line_gap;
        let capacity = ((area.height / pitch).floor() as usize).max(1);

        if lines.len() > capacity {
            lines.truncate(capacity);
            if let Some(last) = lines.last_mut() {
                last.push_str(ELLIPSIS);
            }
        }
        for line in &mut lines {
            if self.measure(line, FontRole::Regular, font_size) > area.width {
                *line = self.ellipsize(line, font_size, area.width);
            }
        }

        FitResult { lines, font_size, overflow }
    }

    fn ellipsize(&self, line: &str, size: f64, max_width: f64) -> String {
        let mut kept: String = line.strip_suffix(ELLIPSIS).unwrap_or(line).to_string();
        loop {
            let candidate = format!("{}{}", kept.trim_end(), ELLIPSIS);
            if kept.is_empty() || self.measure(&candidate, FontRole::Regular, size) <= max_width {
                return candidate;
            }
            kept.pop();
        }
    }

    fn measure(&self, text: &str, font: FontRole, size: f64) -> f64 {
        self.metrics.measure(text, font, size)
    }
}
