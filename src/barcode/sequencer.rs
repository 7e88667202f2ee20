use super::SymbolCode;

/// One bar or space, in page units relative to the barcode's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub offset: f64,
    pub width: f64,
    pub filled: bool,
}

/// Expand symbol codes into bar/space segments scaled by `module_width`.
///
/// Segments alternate starting with a bar inside every symbol. Expansion
/// ends after the first stop symbol; anything after it is ignored.
pub fn sequence(codes: &[SymbolCode], module_width: f64) -> Vec<BarSegment> {
    let mut segments = Vec::with_capacity(codes.len() * 6 + 1);
    let mut cursor = 0.0;

    for &code in codes {
        for (i, &modules) in code.pattern().iter().enumerate() {
            let width = modules as f64 * module_width;
            segments.push(BarSegment {
                offset: cursor,
                width,
                filled: i % 2 == 0,
            });
            cursor += width;
        }
        if code == SymbolCode::STOP {
            break;
        }
    }

    segments
}

/// Total horizontal extent of a segment list.
pub fn span(segments: &[BarSegment]) -> f64 {
    segments.last().map_or(0.0, |s| s.offset + s.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::encode;

    #[test]
    fn test_empty_codes_give_no_segments() {
        assert!(sequence(&[], 1.0).is_empty());
        assert_eq!(span(&[]), 0.0);
    }

    #[test]
    fn test_span_matches_module_count() {
        for (text, m) in [("A1", 1.0), ("X000000000", 0.6), ("", 2.5), ("hello world", 0.33)] {
            let segments = sequence(&encode(text).unwrap(), m);
            let n = text.len() as f64;
            let expected = 11.0 * (n + 2.0) * m + 13.0 * m;
            assert!((span(&segments) - expected).abs() < 1e-9, "span for {:?}", text);
        }
    }

    #[test]
    fn test_segments_are_contiguous_and_alternate() {
        let segments = sequence(&encode("SKU123").unwrap(), 0.75);
        let mut cursor = 0.0;
        for s in &segments {
            assert!((s.offset - cursor).abs() < 1e-9);
            cursor += s.width;
        }
        // 8 symbols of 6 elements plus the 7-element stop
        assert_eq!(segments.len(), 8 * 6 + 7);
        assert!(segments.first().unwrap().filled);
        assert!(segments.last().unwrap().filled);
    }

    #[test]
    fn test_start_b_widths() {
        let segments = sequence(&[SymbolCode::START_B], 2.0);
        let widths: Vec<f64> = segments.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![4.0, 2.0, 2.0, 4.0, 2.0, 8.0]);
        let filled: Vec<bool> = segments.iter().map(|s| s.filled).collect();
        assert_eq!(filled, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_stop_terminates_sequence() {
        let codes = [SymbolCode::START_B, SymbolCode::STOP, SymbolCode::START_B];
        let segments = sequence(&codes, 1.0);
        assert_eq!(segments.len(), 6 + 7);
        assert_eq!(span(&segments), 24.0);
    }
}
