//! Printable sheets of product labels with Code 128 barcodes, and single QR
//! stickers.
//!
//! Labels are laid out on a fixed grid, each carrying an identifier barcode,
//! a fitted description and a few short text fields. Drawing goes through
//! [`surface::DrawSurface`], with [`pdf`] providing the PDF backend.

pub mod barcode;
pub mod config;
pub mod error;
pub mod label;
pub mod layout;
pub mod pdf;
pub mod sticker;
pub mod surface;

pub use error::LabelError;
