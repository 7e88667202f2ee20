//! Code 128 Set B barcode codec.
//!
//! - `encode` turns text into symbol codes with start, checksum and stop
//! - `sequence` walks the module patterns into bar segments at a given scale

mod encoder;
mod patterns;
mod sequencer;

pub use encoder::encode;
pub use sequencer::{sequence, span, BarSegment};

use patterns::{MODULE_PATTERNS, STOP_PATTERN};

/// One Code 128 symbol, a value in 0..=106.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolCode(u8);

impl SymbolCode {
    pub const START_B: SymbolCode = SymbolCode(104);
    pub const STOP: SymbolCode = SymbolCode(106);

    /// `None` for values past the stop code.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::STOP.0).then_some(SymbolCode(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Alternating bar/space widths in modules, starting with a bar.
    pub fn pattern(self) -> &'static [u8] {
        if self == Self::STOP {
            &STOP_PATTERN
        } else {
            &MODULE_PATTERNS[self.0 as usize]
        }
    }
}

/// Estimated module count of a barcode for `len` characters, used to size
/// the module width before encoding.
pub fn estimated_modules(len: usize) -> usize {
    (len + 3) * patterns::SYMBOL_MODULES as usize + patterns::STOP_MODULES as usize
}
