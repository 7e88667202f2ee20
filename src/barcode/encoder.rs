use super::SymbolCode;
use crate::error::LabelError;

const SET_B_FIRST: u32 = 32;
const SET_B_LAST: u32 = 126;

/// Encode `text` as Code 128 Set B: `[START_B, data.., checksum, STOP]`.
///
/// Every character must be printable ASCII; the first one that is not is
/// reported with its 0-based char position.
pub fn encode(text: &str) -> Result<Vec<SymbolCode>, LabelError> {
    let mut codes = Vec::with_capacity(text.len() + 3);
    codes.push(SymbolCode::START_B);

    for (position, character) in text.chars().enumerate() {
        let point = character as u32;
        if !(SET_B_FIRST..=SET_B_LAST).contains(&point) {
            return Err(LabelError::UnsupportedCharacter { character, position });
        }
        codes.push(SymbolCode((point - SET_B_FIRST) as u8));
    }

    codes.push(checksum(&codes));
    codes.push(SymbolCode::STOP);
    Ok(codes)
}

/// Modulo-103 checksum over `[start, data..]`: the start value plus each
/// data value weighted by its 1-based position.
fn checksum(codes: &[SymbolCode]) -> SymbolCode {
    let Some((start, data)) = codes.split_first() else {
        return SymbolCode(0);
    };
    let weighted: u32 = data
        .iter()
        .enumerate()
        .map(|(i, code)| code.0 as u32 * (i as u32 + 1))
        .sum();
    SymbolCode(((start.0 as u32 + weighted) % 103) as u8)
}
