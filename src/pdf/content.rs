//! PDF content stream generation for label sheets.
//!
//! `PdfSurface` turns draw calls in top-down page coordinates into content
//! stream operators in PDF's bottom-up space. Images are kept aside and
//! become XObjects when the document is assembled.

use anyhow::{bail, Result};
use lopdf::{Dictionary, Stream};
use std::io::Write;

use super::resources::font_resource_name;
use crate::surface::{DrawSurface, GrayRaster, Rect, TextRun};

/// Outline width for unfilled rectangles.
const HAIRLINE: f64 = 0.1;

/// Grayscale image drawn on a page, referenced as `/Im<n>` by its content.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PageImage {
    /// Image XObject with 8-bit DeviceGray samples, Flate-compressed.
    pub fn to_xobject(&self) -> Result<Stream> {
        if self.pixels.len() != self.width as usize * self.height as usize {
            bail!(
                "Image {} has {} samples for {}x{} pixels",
                self.name,
                self.pixels.len(),
                self.width,
                self.height
            );
        }
        let mut img_dict = Dictionary::new();
        img_dict.set("Type", "XObject");
        img_dict.set("Subtype", "Image");
        img_dict.set("Width", self.width as i64);
        img_dict.set("Height", self.height as i64);
        img_dict.set("ColorSpace", "DeviceGray");
        img_dict.set("BitsPerComponent", 8_i64);
        img_dict.set("Filter", "FlateDecode");
        Ok(Stream::new(img_dict, compress_data(&self.pixels)?))
    }
}

/// Content stream of one page.
pub struct PdfSurface {
    content: Vec<u8>,
    images: Vec<PageImage>,
    page_height: f64,
}

impl PdfSurface {
    pub fn new(page_height: f64) -> Self {
        Self {
            content: Vec::new(),
            images: Vec::new(),
            page_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Build the final content bytes
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Content bytes plus the images they reference.
    pub fn into_parts(self) -> (Vec<u8>, Vec<PageImage>) {
        (self.content, self.images)
    }

    fn push(&mut self, op: &str) {
        self.content.extend_from_slice(op.as_bytes());
    }
}

impl DrawSurface for PdfSurface {
    fn draw_rect(&mut self, rect: Rect, filled: bool) {
        // Flip Y: PDF measures from the bottom edge
        let y = self.page_height - rect.y - rect.height;
        let op = if filled {
            format!("q 0 g {:.3} {:.3} {:.3} {:.3} re f Q\n", rect.x, y, rect.width, rect.height)
        } else {
            format!(
                "q 0 G {} w {:.3} {:.3} {:.3} {:.3} re S Q\n",
                HAIRLINE, rect.x, y, rect.width, rect.height
            )
        };
        self.push(&op);
    }

    fn draw_text(&mut self, run: TextRun<'_>) {
        if run.content.trim().is_empty() {
            return;
        }
        let y = self.page_height - run.baseline;
        self.push(&format!(
            "BT 0 g /{} {:.2} Tf {:.3} {:.3} Td (",
            font_resource_name(run.font),
            run.size,
            run.x,
            y
        ));
        self.content.extend(escape_pdf_string(run.content));
        self.push(") Tj ET\n");
    }

    fn draw_image(&mut self, raster: GrayRaster<'_>, rect: Rect) {
        let name = format!("Im{}", self.images.len() + 1);
        let y = self.page_height - rect.y - rect.height;
        self.push(&format!(
            "q {:.3} 0 0 {:.3} {:.3} {:.3} cm /{} Do Q\n",
            rect.width, rect.height, rect.x, y, name
        ));
        self.images.push(PageImage {
            name,
            width: raster.width,
            height: raster.height,
            pixels: raster.pixels.to_vec(),
        });
    }
}

/// Encode `s` as a WinAnsi PDF literal string body, escaping special
/// characters. Characters outside Latin-1 become `?`.
pub fn escape_pdf_string(s: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => result.extend_from_slice(br"\("),
            ')' => result.extend_from_slice(br"\)"),
            '\\' => result.extend_from_slice(br"\\"),
            '\n' => result.extend_from_slice(br"\n"),
            '\r' => result.extend_from_slice(br"\r"),
            '\t' => result.extend_from_slice(br"\t"),
            ' '..='~' | '\u{a0}'..='\u{ff}' => result.push(c as u32 as u8),
            _ => result.push(b'?'),
        }
    }
    result
}

/// Compress data using zlib/flate2
pub fn compress_data(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
