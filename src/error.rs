use thiserror::Error;

/// Errors raised by the barcode, QR and layout core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    #[error("unsupported character {character:?} at position {position} (Code 128 Set B accepts ASCII 32-126)")]
    UnsupportedCharacter { character: char, position: usize },

    #[error("invalid layout: cell size {cell_width:.2} x {cell_height:.2} is not positive")]
    InvalidLayout { cell_width: f64, cell_height: f64 },

    #[error("invalid layout: {rows} x {cols} grid exceeds {max} cells per page")]
    GridTooLarge { rows: usize, cols: usize, max: usize },

    #[error("sticker payload is empty")]
    EmptyPayload,

    #[error("cannot encode QR code: {0}")]
    QrEncoding(#[from] qrcode::types::QrError),

    #[error("label #{index}: {source}")]
    InvalidLabel {
        index: usize,
        #[source]
        source: Box<LabelError>,
    },
}

impl LabelError {
    pub fn for_label(self, index: usize) -> Self {
        LabelError::InvalidLabel {
            index,
            source: Box::new(self),
        }
    }
}
