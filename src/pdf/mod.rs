//! PDF output: a drawing surface backed by content streams, font handling,
//! and document assembly with lopdf.

mod content;
mod document;
mod fonts;
mod resources;

pub use content::{PageImage, PdfSurface};
pub use document::build_document;
pub use fonts::{resolve_fonts, FontFace, FontPair, StandardFont};
