//! Single-page QR stickers: a QR code with its payload printed beneath.

use image::{imageops, GrayImage, Luma};
use log::debug;
use qrcode::{EcLevel, QrCode};

use crate::error::LabelError;
use crate::surface::{DrawSurface, FontMetrics, FontRole, GrayRaster, Rect, TextRun};

/// Raster pixels per QR module.
const MODULE_PIXELS: u32 = 10;

/// Page geometry of a sticker, in top-down page points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickerLayout {
    pub page_width: f64,
    pub page_height: f64,
    /// Edge of the square code, centred horizontally.
    pub qr_size: f64,
    pub qr_top: f64,
    /// Caption baseline; the caption is centred horizontally.
    pub caption_baseline: f64,
    pub caption_size: f64,
    pub ec_level: EcLevel,
    /// Light border around the code, in modules.
    pub quiet_zone: u32,
}

impl StickerLayout {
    /// 250 pt square with a 150 pt code and the caption 30 pt above the
    /// bottom edge.
    pub fn square() -> Self {
        Self {
            page_width: 250.0,
            page_height: 250.0,
            qr_size: 150.0,
            qr_top: 30.0,
            caption_baseline: 220.0,
            caption_size: 10.0,
            ec_level: EcLevel::M,
            quiet_zone: 1,
        }
    }

    /// 2 x 2.5 in with a 120 pt code 20 pt from the top, high error
    /// correction.
    pub fn tall() -> Self {
        Self {
            page_width: 144.0,
            page_height: 180.0,
            qr_size: 120.0,
            qr_top: 20.0,
            caption_baseline: 165.0,
            caption_size: 10.0,
            ec_level: EcLevel::H,
            quiet_zone: 2,
        }
    }
}

impl Default for StickerLayout {
    fn default() -> Self {
        Self::square()
    }
}

/// Black-on-white raster of the QR code for `payload`, with a quiet zone of
/// `quiet_zone` modules.
pub fn qr_raster(payload: &str, ec_level: EcLevel, quiet_zone: u32) -> Result<GrayImage, LabelError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), ec_level)?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .dark_color(Luma([0u8]))
        .light_color(Luma([255u8]))
        .build();

    let border = quiet_zone * MODULE_PIXELS;
    let mut raster = GrayImage::from_pixel(
        modules.width() + 2 * border,
        modules.height() + 2 * border,
        Luma([255u8]),
    );
    imageops::overlay(&mut raster, &modules, border as i64, border as i64);
    Ok(raster)
}

/// Draws stickers, one per page.
pub struct StickerComposer<'a, M: FontMetrics + ?Sized> {
    layout: StickerLayout,
    metrics: &'a M,
}

impl<'a, M: FontMetrics + ?Sized> StickerComposer<'a, M> {
    pub fn new(layout: StickerLayout, metrics: &'a M) -> Self {
        Self { layout, metrics }
    }

    pub fn layout(&self) -> &StickerLayout {
        &self.layout
    }

    /// Draw the sticker for `payload`. Surrounding whitespace is ignored and
    /// nothing is drawn when the payload cannot be encoded.
    pub fn compose<S: DrawSurface + ?Sized>(&self, payload: &str, surface: &mut S) -> Result<(), LabelError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(LabelError::EmptyPayload);
        }
        let raster = qr_raster(payload, self.layout.ec_level, self.layout.quiet_zone)?;
        self.draw(payload, &raster, surface);
        Ok(())
    }

    /// One page per payload. Every payload is encoded before the first page is
    /// requested.
    pub fn render<S, F>(&self, payloads: &[String], mut new_page: F) -> Result<Vec<S>, LabelError>
    where
        S: DrawSurface,
        F: FnMut(usize) -> S,
    {
        let mut encoded = Vec::with_capacity(payloads.len());
        for (index, payload) in payloads.iter().enumerate() {
            let payload = payload.trim();
            if payload.is_empty() {
                return Err(LabelError::EmptyPayload.for_label(index));
            }
            let raster = qr_raster(payload, self.layout.ec_level, self.layout.quiet_zone)
                .map_err(|err| err.for_label(index))?;
            encoded.push((payload, raster));
        }

        let pages = encoded
            .iter()
            .enumerate()
            .map(|(index, (payload, raster))| {
                let mut surface = new_page(index);
                self.draw(payload, raster, &mut surface);
                debug!("Composed sticker {} for {:?}", index + 1, payload);
                surface
            })
            .collect();
        Ok(pages)
    }

    fn draw<S: DrawSurface + ?Sized>(&self, payload: &str, raster: &GrayImage, surface: &mut S) {
        let layout = &self.layout;
        surface.draw_image(
            GrayRaster {
                width: raster.width(),
                height: raster.height(),
                pixels: raster.as_raw(),
            },
            Rect {
                x: (layout.page_width - layout.qr_size) / 2.0,
                y: layout.qr_top,
                width: layout.qr_size,
                height: layout.qr_size,
            },
        );

        let width = self.metrics.measure(payload, FontRole::Regular, layout.caption_size);
        surface.draw_text(TextRun {
            content: payload,
            x: (layout.page_width - width) / 2.0,
            baseline: layout.caption_baseline,
            font: FontRole::Regular,
            size: layout.caption_size,
        });
    }
}
