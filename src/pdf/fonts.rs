use anyhow::{anyhow, bail, Context, Result};
use fontdb::Database;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use ttf_parser::Face;

use crate::surface::{FontMetrics, FontRole};

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;
const GLYPHS: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;
const ASCII_GLYPHS: usize = 95;
const LATIN1_FIRST: u8 = 160;
const LATIN1_GLYPHS: usize = 96;

/// Whether `code` is printed as itself. WinAnsi 127..=159 are never emitted
/// since the content stream writes anything outside printable ASCII and
/// Latin-1 as `?`.
fn is_printable(code: u32) -> bool {
    (FIRST_CHAR as u32..=126).contains(&code) || (LATIN1_FIRST as u32..=LAST_CHAR as u32).contains(&code)
}

/// Standard PDF Type1 fonts the engine has built-in metrics for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Get the PDF BaseFont name for this font
    pub fn base_font_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Parse a font name into a StandardFont
    pub fn from_name(name: &str) -> Option<StandardFont> {
        match name.to_lowercase().as_str() {
            "helvetica" => Some(StandardFont::Helvetica),
            "helvetica-bold" => Some(StandardFont::HelveticaBold),
            "helvetica-oblique" => Some(StandardFont::HelveticaOblique),
            "helvetica-boldoblique" => Some(StandardFont::HelveticaBoldOblique),
            "courier" => Some(StandardFont::Courier),
            "courier-bold" => Some(StandardFont::CourierBold),
            "courier-oblique" => Some(StandardFont::CourierOblique),
            "courier-boldoblique" => Some(StandardFont::CourierBoldOblique),
            _ => None,
        }
    }

    /// The heavier face of the same family.
    pub fn bold(self) -> StandardFont {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaBold => StandardFont::HelveticaBold,
            StandardFont::HelveticaOblique | StandardFont::HelveticaBoldOblique => {
                StandardFont::HelveticaBoldOblique
            }
            StandardFont::Courier | StandardFont::CourierBold => StandardFont::CourierBold,
            StandardFont::CourierOblique | StandardFont::CourierBoldOblique => {
                StandardFont::CourierBoldOblique
            }
        }
    }

    /// Advance widths for WinAnsi 32..=255 in 1/1000 em. Codes that are never
    /// printed take the width of `?`. Obliques share the upright widths.
    fn widths(self) -> [u16; GLYPHS] {
        let (ascii, latin1) = match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => {
                (&HELVETICA_WIDTHS, &HELVETICA_LATIN1_WIDTHS)
            }
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => {
                (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_LATIN1_WIDTHS)
            }
            _ => (&COURIER_WIDTHS, &COURIER_LATIN1_WIDTHS),
        };
        let question = ascii[(b'?' - FIRST_CHAR) as usize];
        let mut widths = [question; GLYPHS];
        widths[..ASCII_GLYPHS].copy_from_slice(ascii);
        widths[(LATIN1_FIRST - FIRST_CHAR) as usize..].copy_from_slice(latin1);
        widths
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; ASCII_GLYPHS] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_LATIN1_WIDTHS: [u16; LATIN1_GLYPHS] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; ASCII_GLYPHS] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_LATIN1_WIDTHS: [u16; LATIN1_GLYPHS] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

static COURIER_WIDTHS: [u16; ASCII_GLYPHS] = [600; ASCII_GLYPHS];
static COURIER_LATIN1_WIDTHS: [u16; LATIN1_GLYPHS] = [600; LATIN1_GLYPHS];

#[derive(Debug, Clone)]
enum FaceSource {
    Standard(StandardFont),
    TrueType { data: Vec<u8>, ascent: i64, descent: i64, bbox: [i64; 4] },
}

/// A font face usable both for measuring and for writing into the PDF.
#[derive(Debug, Clone)]
pub struct FontFace {
    base_name: String,
    widths: [u16; GLYPHS],
    /// Width of `?`, which replaces characters WinAnsi cannot print.
    fallback: u16,
    source: FaceSource,
}

impl FontFace {
    pub fn standard(font: StandardFont) -> Self {
        let widths = font.widths();
        Self {
            base_name: font.base_font_name().to_string(),
            fallback: widths[(b'?' - FIRST_CHAR) as usize],
            widths,
            source: FaceSource::Standard(font),
        }
    }

    /// Read metrics from TrueType data. Font collections are rejected since
    /// a simple TrueType font can only embed a single face.
    pub fn true_type(data: Vec<u8>, name: &str) -> Result<Self> {
        if ttf_parser::fonts_in_collection(&data).is_some() {
            bail!("Font '{}' is a font collection, which cannot be embedded", name);
        }
        let face = Face::parse(&data, 0)
            .map_err(|e| anyhow!("Failed to parse font '{}': {}", name, e))?;

        let units = face.units_per_em() as f64;
        let scale = |v: f64| (v * 1000.0 / units).round() as i64;
        let advance = |c: char| {
            face.glyph_index(c)
                .and_then(|g| face.glyph_hor_advance(g))
                .map(|a| scale(a as f64).max(0) as u16)
        };

        let fallback = advance('?').unwrap_or(500);
        let mut widths = [fallback; GLYPHS];
        for (slot, code) in widths.iter_mut().zip(FIRST_CHAR..=LAST_CHAR) {
            if !is_printable(code as u32) {
                continue;
            }
            if let Some(w) = advance(char::from(code)) {
                *slot = w;
            }
        }

        let bb = face.global_bounding_box();
        let bbox = [
            scale(bb.x_min as f64),
            scale(bb.y_min as f64),
            scale(bb.x_max as f64),
            scale(bb.y_max as f64),
        ];
        let ascent = scale(face.ascender() as f64);
        let descent = scale(face.descender() as f64);

        Ok(Self {
            base_name: name.replace(' ', ""),
            widths,
            fallback,
            source: FaceSource::TrueType { data, ascent, descent, bbox },
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Rendered width of `text` at `size` points.
    pub fn width_of(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .map(|c| {
                let code = c as u32;
                if is_printable(code) {
                    self.widths[(code - FIRST_CHAR as u32) as usize] as u32
                } else {
                    self.fallback as u32
                }
            })
            .sum();
        units as f64 * size / 1000.0
    }

    /// Add the font dictionary (and font program, for TrueType) to `doc`.
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        match &self.source {
            FaceSource::Standard(font) => create_font(doc, *font),
            FaceSource::TrueType { data, ascent, descent, bbox } => {
                self.embed_true_type(doc, data, *ascent, *descent, bbox)
            }
        }
    }

    fn embed_true_type(
        &self,
        doc: &mut Document,
        data: &[u8],
        ascent: i64,
        descent: i64,
        bbox: &[i64; 4],
    ) -> ObjectId {
        let mut font_stream_dict = Dictionary::new();
        font_stream_dict.set("Length1", data.len() as i64);
        let font_stream_id = doc.add_object(Stream::new(font_stream_dict, data.to_vec()));

        let mut font_descriptor = Dictionary::new();
        font_descriptor.set("Type", "FontDescriptor");
        font_descriptor.set("FontName", self.base_name.as_str());
        font_descriptor.set("Flags", 32i64); // Nonsymbolic
        font_descriptor.set("FontBBox", bbox.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>());
        font_descriptor.set("ItalicAngle", 0i64);
        font_descriptor.set("Ascent", ascent);
        font_descriptor.set("Descent", descent);
        font_descriptor.set("CapHeight", ascent);
        font_descriptor.set("StemV", 80i64);
        font_descriptor.set("FontFile2", Object::Reference(font_stream_id));
        let descriptor_id = doc.add_object(Object::Dictionary(font_descriptor));

        let mut font_dict = Dictionary::new();
        font_dict.set("Type", "Font");
        font_dict.set("Subtype", "TrueType");
        font_dict.set("BaseFont", self.base_name.as_str());
        font_dict.set("Encoding", "WinAnsiEncoding");
        font_dict.set("FirstChar", FIRST_CHAR as i64);
        font_dict.set("LastChar", LAST_CHAR as i64);
        font_dict.set(
            "Widths",
            self.widths.iter().map(|&w| Object::Integer(w as i64)).collect::<Vec<_>>(),
        );
        font_dict.set("FontDescriptor", Object::Reference(descriptor_id));
        doc.add_object(Object::Dictionary(font_dict))
    }
}

/// Create a standard Type1 font dictionary in the document.
fn create_font(doc: &mut Document, font: StandardFont) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", "Font");
    font_dict.set("Subtype", "Type1");
    font_dict.set("BaseFont", font.base_font_name());
    font_dict.set("Encoding", "WinAnsiEncoding");
    doc.add_object(Object::Dictionary(font_dict))
}

/// The regular and bold faces of a sheet.
#[derive(Debug, Clone)]
pub struct FontPair {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontPair {
    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }
}

impl Default for FontPair {
    fn default() -> Self {
        Self {
            regular: FontFace::standard(StandardFont::Helvetica),
            bold: FontFace::standard(StandardFont::HelveticaBold),
        }
    }
}

impl FontMetrics for FontPair {
    fn measure(&self, text: &str, font: FontRole, size: f64) -> f64 {
        self.face(font).width_of(text, size)
    }
}

/// Resolve the configured font setting.
///
/// - `None`: Helvetica and Helvetica-Bold
/// - a standard font name: that font and its bold variant
/// - anything else: a system TrueType family, regular and bold weights
pub fn resolve_fonts(setting: Option<&str>) -> Result<FontPair> {
    let Some(name) = setting.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(FontPair::default());
    };

    if let Some(font) = StandardFont::from_name(name) {
        return Ok(FontPair {
            regular: FontFace::standard(font),
            bold: FontFace::standard(font.bold()),
        });
    }

    let db = system_font_database();
    let regular_data = find_system_font(&db, name, fontdb::Weight::NORMAL)
        .ok_or_else(|| anyhow!("Font '{}' is neither a standard font nor installed on this system", name))?;
    let regular = FontFace::true_type(regular_data, name)?;

    let bold = match find_system_font(&db, name, fontdb::Weight::BOLD) {
        Some(data) => FontFace::true_type(data, &format!("{} Bold", name))
            .with_context(|| format!("Failed to load bold face of '{}'", name))?,
        None => {
            log::warn!("No bold face found for '{}', using the regular face", name);
            regular.clone()
        }
    };

    Ok(FontPair { regular, bold })
}

fn system_font_database() -> Database {
    let mut db = Database::new();
    db.load_system_fonts();
    if let Ok(home) = std::env::var("HOME") {
        for subpath in [".fonts", ".local/share/fonts"] {
            db.load_fonts_dir(std::path::PathBuf::from(&home).join(subpath));
        }
    }
    db
}

/// Font file bytes for `family` at `weight`, if the database has an exact
/// family match.
fn find_system_font(db: &Database, family: &str, weight: fontdb::Weight) -> Option<Vec<u8>> {
    let query = fontdb::Query {
        families: &[fontdb::Family::Name(family)],
        weight,
        ..Default::default()
    };
    let id = db.query(&query)?;
    let face = db.face(id)?;
    if weight == fontdb::Weight::BOLD && face.weight != fontdb::Weight::BOLD {
        return None;
    }

    match &face.source {
        fontdb::Source::File(path) => fs::read(path).ok(),
        fontdb::Source::Binary(data) => Some(data.as_ref().as_ref().to_vec()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_font_names_round_trip() {
        for font in [
            StandardFont::Helvetica,
            StandardFont::HelveticaBold,
            StandardFont::HelveticaOblique,
            StandardFont::HelveticaBoldOblique,
            StandardFont::Courier,
            StandardFont::CourierBold,
            StandardFont::CourierOblique,
            StandardFont::CourierBoldOblique,
        ] {
            assert_eq!(StandardFont::from_name(font.base_font_name()), Some(font));
        }
        assert_eq!(StandardFont::from_name("HELVETICA"), Some(StandardFont::Helvetica));
        assert_eq!(StandardFont::from_name("Comic Sans"), None);
    }

    #[test]
    fn test_bold_variant() {
        assert_eq!(StandardFont::Helvetica.bold(), StandardFont::HelveticaBold);
        assert_eq!(StandardFont::CourierOblique.bold(), StandardFont::CourierBoldOblique);
    }

    #[test]
    fn test_helvetica_widths() {
        let face = FontFace::standard(StandardFont::Helvetica);
        // A=667, space=278, i=222
        assert!((face.width_of("A", 10.0) - 6.67).abs() < 1e-9);
        assert!((face.width_of("A i", 1000.0) - (667.0 + 278.0 + 222.0)).abs() < 1e-9);
        assert_eq!(face.width_of("", 12.0), 0.0);
    }

    #[test]
    fn test_bold_is_wider() {
        let pair = FontPair::default();
        let text = "Sample Product";
        assert!(pair.measure(text, FontRole::Bold, 6.0) > pair.measure(text, FontRole::Regular, 6.0));
    }

    #[test]
    fn test_latin1_uses_afm_widths() {
        let regular = FontFace::standard(StandardFont::Helvetica);
        let bold = FontFace::standard(StandardFont::HelveticaBold);
        // eacute: 556 in both, question: 556 regular, 611 bold
        assert_eq!(regular.width_of("\u{e9}", 1000.0), 556.0);
        assert_eq!(bold.width_of("\u{e9}", 1000.0), 556.0);
        assert_eq!(bold.width_of("?", 1000.0), 611.0);
        assert_eq!(bold.width_of("\u{dc}", 1000.0), 722.0);
        assert_eq!(regular.width_of("\u{a0}", 1000.0), 278.0);
        assert_eq!(regular.width_of("\u{ff}", 1000.0), 500.0);
    }

    #[test]
    fn test_unprintable_uses_question_mark_width() {
        let bold = FontFace::standard(StandardFont::HelveticaBold);
        // Outside WinAnsi, and a C1 control: both print as `?`
        assert_eq!(bold.width_of("\u{65e5}", 1000.0), bold.width_of("?", 1000.0));
        assert_eq!(bold.width_of("\u{85}", 1000.0), bold.width_of("?", 1000.0));
    }

    #[test]
    fn test_widths_cover_every_printed_byte() {
        use crate::pdf::content::escape_pdf_string;

        let face = FontFace::standard(StandardFont::Helvetica);
        let text: String = (' '..='\u{17f}').collect();
        let printed = escape_pdf_string(&text);
        assert!(printed.iter().all(|&b| b >= FIRST_CHAR));
        assert!(printed.iter().all(|&b| is_printable(b as u32)));
        assert_eq!(face.widths.len(), (LAST_CHAR - FIRST_CHAR + 1) as usize);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let face = FontFace::standard(StandardFont::Courier);
        assert_eq!(face.width_of("iiii", 10.0), face.width_of("WWWW", 10.0));
        assert!((face.width_of("abc", 10.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_standard_setting() {
        let pair = resolve_fonts(Some("courier")).unwrap();
        assert_eq!(pair.regular.base_name(), "Courier");
        assert_eq!(pair.bold.base_name(), "Courier-Bold");

        let pair = resolve_fonts(None).unwrap();
        assert_eq!(pair.regular.base_name(), "Helvetica");
        assert_eq!(pair.bold.base_name(), "Helvetica-Bold");
    }

    #[test]
    fn test_invalid_true_type_data() {
        assert!(FontFace::true_type(vec![0, 1, 2, 3], "Broken").is_err());
    }

    #[test]
    fn test_embed_standard_font() {
        let mut doc = Document::with_version("1.5");
        let id = FontFace::standard(StandardFont::HelveticaBold).embed(&mut doc);
        let dict = doc.get_dictionary(id).unwrap();
        assert_eq!(dict.get(b"BaseFont").unwrap().as_name().unwrap().to_vec(), b"Helvetica-Bold".to_vec());
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap().to_vec(), b"Type1".to_vec());
    }

    #[test]
    fn test_true_type_widths_span_latin1() {
        let mut doc = Document::with_version("1.5");
        let mut face = FontFace::standard(StandardFont::Helvetica);
        face.source = FaceSource::TrueType { data: Vec::new(), ascent: 800, descent: -200, bbox: [0, -200, 1000, 800] };
        let id = face.embed(&mut doc);
        let dict = doc.get_dictionary(id).unwrap();
        assert_eq!(dict.get(b"FirstChar").unwrap().as_i64().unwrap(), 32);
        assert_eq!(dict.get(b"LastChar").unwrap().as_i64().unwrap(), 255);
        let widths = dict.get(b"Widths").unwrap().as_array().unwrap();
        assert_eq!(widths.len(), 224);
        // eacute sits at 0xE9
        assert_eq!(widths[0xE9 - 32].as_i64().unwrap(), 556);
    }
}
